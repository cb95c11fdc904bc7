//! Post-processing passes applied to generated article markup.

pub mod affiliate;
pub mod discovery;
pub mod language;
pub mod seo;
pub mod spelling;

pub use affiliate::{
    AffiliateLink, AffiliateLinkCount, active_links, count_links, inject_affiliate_links,
};
pub use discovery::{DiscoveryMetadata, generate_discovery_metadata};
pub use seo::{MetaTags, SeoReport, optimize_seo};
pub use spelling::{SpellingError, spell_check};

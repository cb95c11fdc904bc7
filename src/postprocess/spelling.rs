//! Lightweight spell checking over article text.
//!
//! Two checks run over the visible text: immediately repeated words, and a
//! per-language table of frequent misspellings. Each flagged word is reported
//! once, in order of first appearance.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::markup::visible_text;
use crate::postprocess::language::primary_subtag;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SpellingError {
    pub word: String,
    pub suggestions: Vec<String>,
}

const ENGLISH: &[(&str, &str)] = &[
    ("accomodate", "accommodate"),
    ("acheive", "achieve"),
    ("alot", "a lot"),
    ("begining", "beginning"),
    ("beleive", "believe"),
    ("calender", "calendar"),
    ("definately", "definitely"),
    ("enviroment", "environment"),
    ("existance", "existence"),
    ("goverment", "government"),
    ("independant", "independent"),
    ("neccessary", "necessary"),
    ("occured", "occurred"),
    ("occurence", "occurrence"),
    ("publically", "publicly"),
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("succesful", "successful"),
    ("teh", "the"),
    ("tommorow", "tomorrow"),
    ("truely", "truly"),
    ("untill", "until"),
    ("wich", "which"),
    ("wierd", "weird"),
];

const PORTUGUESE: &[(&str, &str)] = &[
    ("concerteza", "com certeza"),
    ("excessão", "exceção"),
    ("impecilho", "empecilho"),
    ("mendingo", "mendigo"),
    ("beneficiente", "beneficente"),
    ("previlégio", "privilégio"),
    ("asterístico", "asterisco"),
    ("cabelereiro", "cabeleireiro"),
    ("metereologia", "meteorologia"),
    ("poblema", "problema"),
    ("advinhar", "adivinhar"),
    ("entertido", "entretido"),
    ("iorgute", "iogurte"),
    ("salchicha", "salsicha"),
];

const SPANISH: &[(&str, &str)] = &[
    ("aver", "a ver"),
    ("haiga", "haya"),
    ("nadien", "nadie"),
    ("preveer", "prever"),
    ("expontáneo", "espontáneo"),
    ("inflingir", "infligir"),
    ("dijistes", "dijiste"),
    ("cocreta", "croqueta"),
    ("extrangero", "extranjero"),
    ("vertir", "verter"),
];

fn misspellings_for(language: &str) -> &'static [(&'static str, &'static str)] {
    match primary_subtag(language).as_str() {
        "en" => ENGLISH,
        "pt" => PORTUGUESE,
        "es" => SPANISH,
        _ => &[],
    }
}

pub fn spell_check(html: &str, language: &str) -> Vec<SpellingError> {
    let text = visible_text(html);
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect();
    let table = misspellings_for(language);

    let mut seen: HashSet<String> = HashSet::new();
    let mut errors = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let lower = token.to_lowercase();

        if i > 0
            && tokens[i - 1].to_lowercase() == lower
            && lower.chars().any(char::is_alphabetic)
        {
            let flagged = format!("{} {}", tokens[i - 1], token);
            if seen.insert(flagged.to_lowercase()) {
                errors.push(SpellingError {
                    word: flagged,
                    suggestions: vec![token.to_string()],
                });
            }
            continue;
        }

        if let Some((_, fix)) = table.iter().find(|(wrong, _)| *wrong == lower)
            && seen.insert(lower.clone())
        {
            errors.push(SpellingError {
                word: token.to_string(),
                suggestions: vec![fix.to_string()],
            });
        }
    }
    errors
}

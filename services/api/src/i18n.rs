//! Localized validation messages
//!
//! Messages are compiled in for every supported [`Locale`]. The locale of a
//! request is negotiated from its `Accept-Language` header.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::error::FieldViolation;
use crate::validation::rules;

/// Supported message locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

#[derive(Debug, Error)]
#[error("unsupported locale `{0}`")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    /// Match a language tag such as `es`, `es-AR` or `EN_us`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Pick the best supported locale from an `Accept-Language` value
    ///
    /// Candidates are ranked by their `q` weight; ties keep header order.
    /// Falls back to `fallback` when nothing matches.
    pub fn negotiate(header: Option<&str>, fallback: Locale) -> Locale {
        let Some(header) = header else {
            return fallback;
        };

        let mut candidates: Vec<(f32, Locale)> = header
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let locale = Locale::from_tag(parts.next()?)?;
                let weight = parts
                    .find_map(|param| param.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((weight, locale))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.first().map(|(_, locale)| *locale).unwrap_or(fallback)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a violation as a human message in `locale`
pub fn translate(locale: Locale, violation: &FieldViolation) -> String {
    let field = display_name(&violation.field);
    let arg = |name: &str| param(violation, name);

    match (locale, violation.rule.as_str()) {
        (Locale::En, rules::REQUIRED) => format!("{field} is a required field"),
        (Locale::Es, rules::REQUIRED) => format!("{field} es un campo requerido"),

        (Locale::En, rules::LENGTH) => match (arg("min"), arg("max")) {
            (_, Some(max)) => format!("{field} must be a maximum of {max} characters in length"),
            (Some(min), None) => format!("{field} must be at least {min} characters in length"),
            (None, None) => format!("{field} has an invalid length"),
        },
        (Locale::Es, rules::LENGTH) => match (arg("min"), arg("max")) {
            (_, Some(max)) => format!("{field} debe tener un máximo de {max} caracteres"),
            (Some(min), None) => format!("{field} debe tener al menos {min} caracteres"),
            (None, None) => format!("{field} tiene una longitud inválida"),
        },

        (Locale::En, rules::RANGE) => match (arg("min"), arg("max")) {
            (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
            (Some(min), None) => format!("{field} must be {min} or greater"),
            (None, Some(max)) => format!("{field} must be {max} or less"),
            (None, None) => format!("{field} is out of range"),
        },
        (Locale::Es, rules::RANGE) => match (arg("min"), arg("max")) {
            (Some(min), Some(max)) => format!("{field} debe estar entre {min} y {max}"),
            (Some(min), None) => format!("{field} debe ser {min} o más"),
            (None, Some(max)) => format!("{field} debe ser {max} o menos"),
            (None, None) => format!("{field} está fuera de rango"),
        },

        (Locale::En, rules::ONE_OF) => {
            format!("{field} must be one of [{}]", arg("values").unwrap_or_default())
        }
        (Locale::Es, rules::ONE_OF) => {
            format!("{field} debe ser uno de [{}]", arg("values").unwrap_or_default())
        }

        (Locale::En, rules::UNIQUE) => format!("{field} must be unique"),
        (Locale::Es, rules::UNIQUE) => format!("{field} debe ser único"),

        (Locale::En, rules::USER_TYPE) => format!("{field} must be an existing user type"),
        (Locale::Es, rules::USER_TYPE) => format!("{field} debe ser un tipo de usuario existente"),

        (Locale::En, rule) => format!("{field} failed on the '{rule}' rule"),
        (Locale::Es, rule) => format!("{field} falló en la regla '{rule}'"),
    }
}

/// `UserTypeCreateResource.Name` reads as `Name`
fn display_name(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

fn param(violation: &FieldViolation, name: &str) -> Option<String> {
    violation.params.get(name).map(|value| match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(rule: &str, params: &[(&str, serde_json::Value)]) -> FieldViolation {
        let mut violation = FieldViolation::new("UserCreateResource.Username", rule);
        for (name, value) in params {
            violation.params.insert(name.to_string(), value.clone());
        }
        violation
    }

    #[test]
    fn test_negotiate_prefers_highest_weight() {
        assert_eq!(Locale::negotiate(Some("es-AR,en;q=0.8"), Locale::En), Locale::Es);
        assert_eq!(Locale::negotiate(Some("fr, en;q=0.5, es;q=0.9"), Locale::En), Locale::Es);
        assert_eq!(Locale::negotiate(Some("en-US"), Locale::Es), Locale::En);
    }

    #[test]
    fn test_negotiate_falls_back() {
        assert_eq!(Locale::negotiate(None, Locale::Es), Locale::Es);
        assert_eq!(Locale::negotiate(Some("fr-FR,de"), Locale::En), Locale::En);
        assert_eq!(Locale::negotiate(Some("es;q=0"), Locale::En), Locale::En);
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("ES".parse::<Locale>().unwrap(), Locale::Es);
        assert!("klingon".parse::<Locale>().is_err());
    }

    #[test]
    fn test_translate_uses_field_display_name_and_params() {
        let length = violation(rules::LENGTH, &[("max", serde_json::json!(50))]);
        assert_eq!(
            translate(Locale::En, &length),
            "Username must be a maximum of 50 characters in length"
        );
        assert_eq!(
            translate(Locale::Es, &length),
            "Username debe tener un máximo de 50 caracteres"
        );

        let one_of = violation(rules::ONE_OF, &[("values", serde_json::json!("asc desc"))]);
        assert_eq!(translate(Locale::En, &one_of), "Username must be one of [asc desc]");
    }

    #[test]
    fn test_translate_unknown_rule() {
        let odd = violation("email", &[]);
        assert_eq!(translate(Locale::En, &odd), "Username failed on the 'email' rule");
        assert_eq!(translate(Locale::Es, &odd), "Username falló en la regla 'email'");
    }
}

//! Named color palettes for the color cycle effect

use thiserror::Error;

use crate::color::ColorF;

#[derive(Debug, Clone, PartialEq)]
pub struct Scheme {
    pub name: &'static str,
    pub colors: Vec<ColorF>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    #[error("unknown color scheme: {name}. Available schemes: {}", .available.join(", "))]
    UnknownScheme {
        name: String,
        available: Vec<&'static str>,
    },
}

fn scheme(name: &'static str, colors: &[(f64, f64, f64)]) -> Scheme {
    Scheme {
        name,
        colors: colors
            .iter()
            .map(|&(r, g, b)| ColorF::new(r, g, b))
            .collect(),
    }
}

lazy_static::lazy_static! {
    static ref SCHEMES: [Scheme; 5] = [
        // Red -> Orange -> Pink
        scheme("sunset", &[(1.0, 0.0, 0.0), (1.0, 0.5, 0.0), (1.0, 0.0, 0.5)]),
        // Blue -> Cyan variations
        scheme("ocean", &[(0.0, 0.5, 1.0), (0.0, 1.0, 0.8), (0.0, 0.8, 1.0)]),
        // Green variations
        scheme("forest", &[(0.0, 0.8, 0.0), (0.5, 0.8, 0.0), (0.0, 0.6, 0.0)]),
        // Purple -> Gold -> Purple
        scheme("purple_gold", &[(0.5, 0.0, 1.0), (1.0, 0.8, 0.0), (0.8, 0.0, 1.0)]),
        // Cyan -> Magenta -> Yellow
        scheme("cyberpunk", &[(0.0, 1.0, 1.0), (1.0, 0.0, 1.0), (1.0, 1.0, 0.0)]),
    ];
}

/// Names of all registered schemes, in registry order
pub fn names() -> Vec<&'static str> {
    SCHEMES.iter().map(|scheme| scheme.name).collect()
}

pub fn find(name: &str) -> Result<&'static Scheme, SchemeError> {
    SCHEMES
        .iter()
        .find(|scheme| scheme.name == name)
        .ok_or_else(|| SchemeError::UnknownScheme {
            name: name.to_owned(),
            available: names(),
        })
}

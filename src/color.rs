//! Display colors for sections.
//!
//! A color is picked once when a section is created and never changes. It
//! only correlates a rendered line with its table row; colors are not
//! unique, so never use them to tell sections apart.

use rand::Rng;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Strategy invoked once per created section.
pub trait ColorPolicy: Send {
    /// Produce a CSS-style color for the next section.
    fn next_color(&mut self) -> String;
}

/// Uniform random `#RRGGBB` color, each of the six hex digits drawn
/// independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomHexColor;

impl ColorPolicy for RandomHexColor {
    fn next_color(&mut self) -> String {
        let mut rng = rand::rng();
        let digits: String = (0..6)
            .map(|_| HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())] as char)
            .collect();
        format!("#{digits}")
    }
}

/// Same color for every section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedColor(pub String);

impl Default for FixedColor {
    fn default() -> Self {
        FixedColor("blue".to_string())
    }
}

impl ColorPolicy for FixedColor {
    fn next_color(&mut self) -> String {
        self.0.clone()
    }
}

impl<F> ColorPolicy for F
where
    F: FnMut() -> String + Send,
{
    fn next_color(&mut self) -> String {
        self()
    }
}

//! CSS selectors for the marketplace listing page.
//!
//! Update this file when the marketplace changes its markup. When prices stop
//! showing up, capture the page HTML, fix the selectors and add a fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for the vehicle listing page.
pub mod listing {
    use super::*;

    /// Raw selector string, shared with the browser backend's render wait.
    pub const PRICE_FRACTION_CSS: &str = ".andes-money-amount__fraction";

    /// Integer part of every displayed price (listings, ads and accessories alike).
    pub static PRICE_FRACTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(PRICE_FRACTION_CSS).unwrap());
}

/// Selectors for block and verification pages.
pub mod errors {
    use super::*;

    /// Captcha or account-verification challenge.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#captcha, \
             .g-recaptcha, \
             form[action*='captcha'], \
             form[action*='account-verification']",
        )
        .unwrap()
    });
}

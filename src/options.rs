use std::sync::{LazyLock, RwLock};

use log::debug;

use crate::{
    error::{Error, Result},
    variant,
};

/// Provides read-only access to the library options.
pub trait ReadOnlyOptions {
    /// Returns the name of the variant used for new positions.
    fn variant(&self) -> &str;

    /// Returns true if new positions write castling moves in the king-captures-rook form.
    fn chess960(&self) -> bool;
}

/// Process-wide options, set by name like UCI options.
#[derive(Debug, Clone)]
pub struct Options {
    /// The variant used by `Position::from_options`. Must name a registered variant.
    variant: String,

    /// Whether `Position::from_options` creates positions in Chess960 castling mode.
    chess960: bool,
}

static OPTIONS: LazyLock<RwLock<Options>> = LazyLock::new(|| RwLock::new(Options::default()));

impl Default for Options {
    fn default() -> Self {
        Self { variant: String::from("chess"), chess960: false }
    }
}

impl ReadOnlyOptions for Options {
    fn variant(&self) -> &str {
        &self.variant
    }

    fn chess960(&self) -> bool {
        self.chess960
    }
}

impl Options {
    /// Name of the option selecting the variant.
    pub const VARIANT: &'static str = "UCI_Variant";

    /// Name of the option selecting the castling mode.
    pub const CHESS960: &'static str = "UCI_Chess960";

    /// Returns a copy of the current global options.
    pub fn get() -> impl ReadOnlyOptions {
        OPTIONS.read().expect("Options should always be available").clone()
    }

    /// Modifies the current global options atomically using the provided closure.
    pub fn modify<F>(f: F)
    where
        F: FnOnce(&mut Options),
    {
        let mut options = OPTIONS.write().expect("Options should always be available");
        f(&mut options);
    }

    /// Sets an option from its name and textual value. Option names are case-insensitive.
    ///
    /// # Errors
    /// * `UnrecognizedOption` - If no option has this name
    /// * `InvalidOptionValue` - If the value cannot be used for the option
    pub fn set_option(name: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidOptionValue { name: name.to_string(), value: value.to_string() };

        if name.eq_ignore_ascii_case(Self::VARIANT) {
            let variant = variant::get(value).map_err(|_| invalid())?;
            Options::modify(|options| options.set_variant(variant.name()));
        } else if name.eq_ignore_ascii_case(Self::CHESS960) {
            let chess960 = value.parse::<bool>().map_err(|_| invalid())?;
            Options::modify(|options| options.set_chess960(chess960));
        } else {
            return Err(Error::UnrecognizedOption(name.to_string()));
        }

        debug!("Option {} set to {}", name, value);
        Ok(())
    }

    /// Sets the variant used for new positions.
    pub fn set_variant(&mut self, variant: &str) {
        self.variant = variant.to_string();
    }

    /// Sets whether new positions use the Chess960 castling mode.
    pub fn set_chess960(&mut self, chess960: bool) {
        self.chess960 = chess960;
    }
}

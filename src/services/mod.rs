// Floatshell services
// Stateless or self-contained helpers: layout math, zoom bookkeeping, url input, settings.

pub mod bounds_calculator;
pub mod settings_engine;
pub mod url_input;
pub mod zoom_ledger;

pub mod error;
pub mod html;
pub mod locale;
pub mod logger;
pub mod validation;

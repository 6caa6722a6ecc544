//! Authentication: bearer tokens and the extractors built on them.

pub mod extractor;
pub mod jwt;
pub mod layer;
pub mod types;

pub use extractor::{Auth, CurrentActor};
pub use jwt::{decode_token, encode_token};
pub use layer::{AuthLayer, AuthMiddleware};
pub use types::{AuthUser, Claims};

//! REST access to the catalog API.
//!
//! All authorized traffic flows through [`Dispatcher`]; [`ProductApi`] is a
//! typed layer on top of it. The network itself sits behind
//! [`HttpTransport`], with [`ReqwestTransport`] as the production backend.

pub mod dispatcher;
pub mod models;
pub mod products;
pub mod transport;

pub use dispatcher::{ApiRequest, Dispatcher};
pub use models::{NewProduct, Product, ProductId, ProductPage, ProductUpdate};
pub use products::ProductApi;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use reqwest::Method;

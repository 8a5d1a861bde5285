pub mod error;
pub mod http;
pub mod netflix;
pub mod notify;
pub mod traits;
pub mod trakt;

pub use error::{DeviceAuthError, NetflixError, TraktError};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use netflix::NetflixClient;
pub use notify::{LogNotifier, Notifier, SlackNotifier};
pub use traits::{ActivitySource, Catalog};
pub use trakt::{AuthState, DeviceCode, TraktClient};

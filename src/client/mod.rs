//! Client-side pieces: the API client proper, plus the thin local
//! collaborators around it (account persistence, resource upload).
//!
//! # Basic Usage
//! ```no_run
//! use castellan::client::ApiClient;
//! use castellan::facade::params::LoginArgs;
//! use castellan::tag::Tag;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let login = LoginArgs {
//!         auth_tag: "machine-0".into(),
//!         credentials: "password".into(),
//!         nonce: Some("fake_nonce".into()),
//!     };
//!     let client = ApiClient::connect("127.0.0.1:17070", "localhost", b"<ca pem>", login)
//!         .await
//!         .unwrap();
//!
//!     let keys = client.authorised_keys(&Tag::machine("0")).await.unwrap();
//!     println!("authorized keys: {keys:?}");
//!
//!     let mut watcher = client.watch_authorised_keys(&Tag::machine("0")).await.unwrap();
//!     watcher.next().await; // initial event
//!     client.close();
//! }
//! ```

mod accounts;
mod client;
mod upload;

pub use accounts::*;
pub use client::*;
pub use upload::*;

//! Async client for the ERP billing backend: bearer sessions with single-flight token refresh,
//! purchase bills, inventory, and dashboard analytics behind one gateway.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod analytics;
pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod id;
pub mod inventory;
pub mod obs;
pub mod page;
pub mod store;
pub mod validate;

mod lenient;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Date, Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};

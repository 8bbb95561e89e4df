// SPDX-FileCopyrightText: 2026 Newsbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supplier traits consumed by the delivery engine and the messaging layer.
//!
//! All traits use `#[async_trait]` so they can be held as `Arc<dyn _>`.

pub mod adapter;
pub mod favorites;
pub mod ledger;
pub mod service;
pub mod sink;
pub mod source;
pub mod subscriptions;
pub mod users;

pub use adapter::PluginAdapter;
pub use favorites::FavoriteStore;
pub use ledger::SentArticleLedger;
pub use service::NewsService;
pub use sink::DeliverySink;
pub use source::ArticleSource;
pub use subscriptions::SubscriptionRegistry;
pub use users::UserDirectory;

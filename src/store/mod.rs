// 外部子系统的具体实现

mod account;
mod billing;
mod emergency;
mod notify;

pub use account::{PgAccountDeletion, PgAccountStore};
pub use billing::HttpBillingClient;
pub use emergency::PgEmergencyContacts;
pub use notify::{LogNotifier, WebhookNotifier};

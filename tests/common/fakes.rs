//! Test doubles for the external services
//!
//! `FakeBilling` stands in for Stripe and `RecordingMailer` keeps every
//! message instead of sending it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use cardapio::backend::billing::provider::{
    BillingProvider, CheckoutRequest, CheckoutSession, List, PortalSession, Price,
    StripeCheckoutSession, StripeSubscription, SubscriptionItem,
};
use cardapio::backend::billing::BillingError;
use cardapio::backend::mail::{MailError, Mailer, OutgoingMail};

/// Stripe stand-in with canned responses
#[derive(Default)]
pub struct FakeBilling {
    pub customers: Mutex<Vec<String>>,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    /// Subscriptions returned by `retrieve_subscription`
    pub subscriptions: Mutex<HashMap<String, StripeSubscription>>,
}

impl FakeBilling {
    pub fn add_subscription(&self, id: &str, customer: &str, price_id: &str, status: &str, period_end: i64) {
        let subscription = StripeSubscription {
            id: id.to_string(),
            customer: Some(customer.to_string()),
            status: status.to_string(),
            current_period_end: Some(period_end),
            cancel_at_period_end: false,
            items: List {
                data: vec![SubscriptionItem {
                    price: Price {
                        id: price_id.to_string(),
                    },
                    current_period_end: None,
                }],
            },
            metadata: HashMap::new(),
        };
        self.subscriptions
            .lock()
            .unwrap()
            .insert(id.to_string(), subscription);
    }

    pub fn checkout_count(&self) -> usize {
        self.checkouts.lock().unwrap().len()
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn create_customer(&self, _email: &str, _user_id: Uuid) -> Result<String, BillingError> {
        let mut customers = self.customers.lock().unwrap();
        let id = format!("cus_test_{}", customers.len() + 1);
        customers.push(id.clone());
        Ok(id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        let mut checkouts = self.checkouts.lock().unwrap();
        checkouts.push(request.clone());
        let id = format!("cs_test_{}", checkouts.len());
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.stripe.test/{}", id)),
            id,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        _return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        Ok(PortalSession {
            url: format!("https://billing.stripe.test/{}", customer_id),
        })
    }

    async fn retrieve_subscription(&self, id: &str) -> Result<StripeSubscription, BillingError> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| BillingError::Api {
                status: 404,
                message: format!("No such subscription: '{}'", id),
            })
    }

    async fn retrieve_checkout_session(
        &self,
        id: &str,
    ) -> Result<StripeCheckoutSession, BillingError> {
        Err(BillingError::Api {
            status: 404,
            message: format!("No such checkout session: '{}'", id),
        })
    }
}

/// Mailer that keeps what it was asked to send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    /// When set, every send fails with a transport error
    pub failing: AtomicBool,
}

impl RecordingMailer {
    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn last(&self) -> Option<OutgoingMail> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Transport("connection refused".into()));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

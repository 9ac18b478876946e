//! In-memory ledger and wallet used by the controller tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use msgx::error::{LedgerError, WalletError};
use msgx::ledger::LedgerClient;
use msgx::types::{
    AccountSnapshot, Address, ModuleAbi, ModuleDescriptor, ModuleSet, RawResource, SubmitReceipt,
    TransactionPayload, WalletAccount,
};
use msgx::wallet::Wallet;
use msgx::{App, AppEvent};

#[derive(Default)]
pub struct FakeLedger {
    pub sequence_number: Cell<u64>,
    pub modules: RefCell<Vec<String>>,
    /// Hex values stored in `MessageHolder` records, in node order.
    pub messages: RefCell<Vec<String>>,
    pub fail_resources: Cell<bool>,
    pub account_calls: Cell<usize>,
    pub module_calls: Cell<usize>,
    pub resource_calls: Cell<usize>,
}

impl FakeLedger {
    pub fn with_module() -> Self {
        let ledger = FakeLedger::default();
        ledger.modules.borrow_mut().push("message".into());
        ledger
    }

    pub fn set_message(&self, hex: &str) {
        *self.messages.borrow_mut() = vec![hex.to_string()];
    }
}

#[async_trait(?Send)]
impl LedgerClient for FakeLedger {
    async fn get_account(&self, _address: &Address) -> Result<AccountSnapshot, LedgerError> {
        self.account_calls.set(self.account_calls.get() + 1);
        Ok(AccountSnapshot {
            sequence_number: self.sequence_number.get(),
            authentication_key: "0x00".into(),
        })
    }

    async fn get_account_modules(&self, address: &Address) -> Result<ModuleSet, LedgerError> {
        self.module_calls.set(self.module_calls.get() + 1);
        Ok(self
            .modules
            .borrow()
            .iter()
            .map(|name| ModuleDescriptor {
                bytecode: "0x00".into(),
                abi: Some(ModuleAbi {
                    address: address.to_string(),
                    name: name.clone(),
                }),
            })
            .collect())
    }

    async fn get_account_resources(
        &self,
        address: &Address,
    ) -> Result<Vec<RawResource>, LedgerError> {
        self.resource_calls.set(self.resource_calls.get() + 1);
        if self.fail_resources.get() {
            return Err(LedgerError::Status {
                status: 503,
                url: "fake://resources".into(),
                message: "unavailable".into(),
            });
        }
        let mut out = vec![RawResource {
            type_tag: "0x1::account::Account".into(),
            data: json!({"sequence_number": "0"}),
        }];
        for hex in self.messages.borrow().iter() {
            out.push(RawResource {
                type_tag: address.message_holder_type(),
                data: json!({ "message": hex }),
            });
        }
        Ok(out)
    }
}

pub struct FakeWallet {
    pub address: RefCell<Option<Address>>,
    pub reject_signing: Cell<bool>,
    pub connect_calls: Cell<usize>,
    pub sign_calls: Cell<usize>,
    pub last_payload: RefCell<Option<TransactionPayload>>,
}

impl FakeWallet {
    pub fn at(address: &str) -> Self {
        FakeWallet {
            address: RefCell::new(Some(Address::new(address))),
            reject_signing: Cell::new(false),
            connect_calls: Cell::new(0),
            sign_calls: Cell::new(0),
            last_payload: RefCell::new(None),
        }
    }

    pub fn absent() -> Self {
        let w = FakeWallet::at("0x0");
        *w.address.borrow_mut() = None;
        w
    }

    fn current(&self) -> Result<WalletAccount, WalletError> {
        match self.address.borrow().as_ref() {
            Some(a) => Ok(WalletAccount {
                address: a.clone(),
                public_key: None,
            }),
            None => Err(WalletError::Rejected("user denied".into())),
        }
    }
}

#[async_trait(?Send)]
impl Wallet for FakeWallet {
    async fn connect(&self) -> Result<WalletAccount, WalletError> {
        self.connect_calls.set(self.connect_calls.get() + 1);
        self.current()
    }

    async fn account(&self) -> Result<WalletAccount, WalletError> {
        self.current()
    }

    async fn sign_and_submit_transaction(
        &self,
        payload: &TransactionPayload,
    ) -> Result<SubmitReceipt, WalletError> {
        self.sign_calls.set(self.sign_calls.get() + 1);
        *self.last_payload.borrow_mut() = Some(payload.clone());
        if self.reject_signing.get() {
            return Err(WalletError::Rejected("user rejected the request".into()));
        }
        Ok(SubmitReceipt {
            hash: Some("0xfeed".into()),
            raw: json!({"hash": "0xfeed"}),
        })
    }
}

pub fn app_with(
    ledger: &Rc<FakeLedger>,
    wallet: &Rc<FakeWallet>,
) -> (App, UnboundedReceiver<AppEvent>) {
    let (tx, rx) = unbounded_channel();
    let app = App::new(ledger.clone(), wallet.clone(), tx);
    (app, rx)
}

/// Fold events until the controller has nothing outstanding.
pub async fn settle(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    while !app.is_settled() {
        let ev = rx.recv().await.expect("event channel closed");
        app.on_event(ev);
    }
}

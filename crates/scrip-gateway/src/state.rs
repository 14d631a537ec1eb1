use scrip_minter::Minter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    minter: Arc<dyn Minter>,
}

impl AppState {
    pub fn new(minter: Arc<dyn Minter>) -> Self {
        Self { minter }
    }

    pub fn minter(&self) -> &dyn Minter {
        self.minter.as_ref()
    }
}

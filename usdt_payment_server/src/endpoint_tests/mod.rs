mod helpers;
mod mocks;

mod deposits;
mod misc;
mod webhooks;
mod withdrawals;

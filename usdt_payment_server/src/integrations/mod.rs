pub mod oxapay;

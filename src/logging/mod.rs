pub mod order_audit;

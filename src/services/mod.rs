pub mod assignment;
pub mod employees;
pub mod material_usage;
pub mod measurements;
pub mod order_status;
pub mod orders;
pub mod purchase_orders;
pub mod suppliers;
pub mod tasks;
pub mod workload;

//! sea-orm entities. Status/stage/priority columns are stored as their
//! snake_case string forms and parsed into `workflow` enums at the
//! service boundary.

pub mod employee;
pub mod employee_skill;
pub mod employee_specialization;
pub mod material_usage;
pub mod measurement;
pub mod order;
pub mod order_history;
pub mod purchase_order;
pub mod supplier;
pub mod task;

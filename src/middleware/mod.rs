pub mod permission;

pub use permission::{
    customer_id_for, distributor_id_for, get_current_user, manufacturer_id_for, require_role,
    CurrentUser,
};

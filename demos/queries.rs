// Code generated by sqlbind. DO NOT EDIT.
#![allow(dead_code)]

/// PostgreSQL enum `order_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Orders for a user, or all orders when @user_id is NULL.
pub const LIST_ORDERS: &str = "SELECT o.id, o.user_id, o.status, o.total_cents\nFROM orders o\nWHERE ($2::int8 IS NULL OR o.user_id = $2)\nORDER BY o.created_at DESC\nLIMIT $1";

#[derive(Debug, Clone)]
pub struct ListOrdersParams {
    pub limit: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct ListOrdersRow {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub total_cents: i64,
}

pub const PRUNE_CANCELLED: &str = "DELETE FROM orders WHERE status = 'cancelled' AND created_at < $1";

#[derive(Debug, Clone)]
pub struct PruneCancelledParams {
    pub created_at: String,
}

/// Fetch a single user by primary key.
pub const GET_USER: &str = "SELECT id, name, email, bio FROM users WHERE id = $1";

#[derive(Debug, Clone)]
pub struct GetUserParams {
    pub id: i64,
}

#[derive(Debug, Clone)]
pub struct GetUserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

pub const CREATE_USER: &str = "INSERT INTO users (name, email, bio) VALUES ($1, $2, $3) RETURNING id, created_at";

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub name: String,
    pub email: String,
    pub bio: String,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub id: i64,
    pub created_at: String,
}

/// Lock an account until the given time.
pub const LOCK_USER: &str = "UPDATE users SET locked_until_at = $2 WHERE id = $1 RETURNING id, locked_until_at";

#[derive(Debug, Clone)]
pub struct LockUserParams {
    pub id: i64,
    pub locked_until_at: String,
}

#[derive(Debug, Clone)]
pub struct LockUserRow {
    pub id: i64,
    pub locked_until_at: Option<String>,
}

pub const COUNT_USERS: &str = "SELECT COUNT(*) AS total! FROM users";

#[derive(Debug, Clone)]
pub struct CountUsersRow {
    pub total: i64,
}

pub const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

#[derive(Debug, Clone)]
pub struct DeleteUserParams {
    pub id: i64,
}

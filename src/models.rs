pub mod auth;
pub mod expense;
pub mod user;

pub use auth::{AuthToken, LoginRequest, TokenUser};
pub use expense::{
    CreateExpenseRequest, CreatedAt, Expense, ExpenseChanges, ExpenseResponse, NewExpense,
    UpdateExpenseRequest,
};
pub use user::{NewUser, PublicUser, RegisterUserRequest, User};

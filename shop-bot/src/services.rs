//! In-memory application services: accounts, catalog, orders, feedback.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use action_dispatch::UserService;
use async_trait::async_trait;
use dbot_core::{Result, User};
use tokio::sync::RwLock;
use tracing::info;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

/// Account resolved for every sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopAccount {
    pub user_id: i64,
    pub display_name: String,
    pub is_admin: bool,
}

/// Creates accounts on first contact. Admins are listed by user id.
pub struct InMemoryUsers {
    accounts: RwLock<HashMap<i64, ShopAccount>>,
    admin_ids: HashSet<i64>,
}

impl InMemoryUsers {
    pub fn new(admin_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            admin_ids: admin_ids.into_iter().collect(),
        }
    }

    /// Parses a comma-separated id list (ADMIN_IDS); malformed entries are skipped.
    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl UserService for InMemoryUsers {
    type Account = ShopAccount;

    async fn check_user(&self, principal: &User) -> Result<ShopAccount> {
        if let Some(account) = self.accounts.read().await.get(&principal.id) {
            return Ok(account.clone());
        }
        let account = ShopAccount {
            user_id: principal.id,
            display_name: principal
                .first_name
                .clone()
                .or_else(|| principal.username.clone())
                .unwrap_or_else(|| principal.id.to_string()),
            is_admin: self.admin_ids.contains(&principal.id),
        };
        info!(user_id = principal.id, is_admin = account.is_admin, "Account created");
        let mut accounts = self.accounts.write().await;
        Ok(accounts.entry(principal.id).or_insert(account).clone())
    }

    fn check_role(&self, account: &ShopAccount, role: &str) -> bool {
        match role {
            ROLE_ADMIN => account.is_admin,
            ROLE_CUSTOMER => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: u32,
    pub title: String,
    pub description: String,
    /// Price in major currency units.
    pub price: u32,
    pub image_url: String,
}

/// Fixed product list.
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let product = |id, title: &str, description: &str, price, image: &str| Product {
            id,
            title: title.to_string(),
            description: description.to_string(),
            price,
            image_url: format!("https://picsum.photos/seed/{}/400/300", image),
        };
        Self::new(vec![
            product(1, "Coffee beans", "Medium roast, 1 kg", 990, "coffee"),
            product(2, "Tea set", "Porcelain pot with four cups", 2490, "tea"),
            product(3, "Grinder", "Manual burr grinder", 3150, "grinder"),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub user_id: i64,
    pub payload: String,
    /// Minor currency units as reported by the payment.
    pub total_amount: u32,
    pub currency: String,
}

#[derive(Default)]
pub struct OrderBook {
    orders: RwLock<Vec<Order>>,
}

impl OrderBook {
    pub async fn record(&self, order: Order) {
        self.orders.write().await.push(order);
    }

    pub async fn all(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub user_id: i64,
    pub text: String,
}

#[derive(Default)]
pub struct FeedbackLog {
    entries: RwLock<Vec<Feedback>>,
}

impl FeedbackLog {
    pub async fn push(&self, entry: Feedback) {
        self.entries.write().await.push(entry);
    }

    pub async fn all(&self) -> Vec<Feedback> {
        self.entries.read().await.clone()
    }
}

/// Services handed to controllers at registration time.
#[derive(Clone, Default)]
pub struct ShopServices {
    pub catalog: Arc<Catalog>,
    pub orders: Arc<OrderBook>,
    pub feedback: Arc<FeedbackLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> User {
        User {
            id,
            username: Some("shopper".to_string()),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_parse_admin_ids_skips_garbage() {
        assert_eq!(InMemoryUsers::parse_admin_ids("1, 2,x,,3"), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_check_user_creates_once() {
        let users = InMemoryUsers::new([7]);

        let first = users.check_user(&user(7)).await.unwrap();
        let again = users.check_user(&user(7)).await.unwrap();

        assert_eq!(first, again);
        assert!(first.is_admin);
        assert_eq!(first.display_name, "shopper");
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn test_check_role() {
        let users = InMemoryUsers::new([]);
        let account = users.check_user(&user(8)).await.unwrap();

        assert!(users.check_role(&account, ROLE_CUSTOMER));
        assert!(!users.check_role(&account, ROLE_ADMIN));
        assert!(!users.check_role(&account, "owner"));
    }

    #[test]
    fn test_default_catalog_lookup() {
        let catalog = Catalog::default();
        assert_eq!(catalog.get(2).map(|p| p.price), Some(2490));
        assert!(catalog.get(99).is_none());
    }
}

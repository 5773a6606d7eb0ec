//! In-memory store
//!
//! Tenant-keyed collections behind a concurrent map. Each `commit_*`
//! call mutates one tenant entry under its shard lock, which gives the
//! same all-or-nothing visibility a database transaction would.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::{
    Ingredient, InvoiceNumber, PriceHistoryEntry, Product, StockMovement, ZReport,
};
use shared::order::Order;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::BTreeMap;

use crate::orders::cancellation::CancellationAudit;
use crate::ports::EngineStore;

#[derive(Debug, Default)]
struct TenantState {
    products: Vec<Product>,
    ingredients: Vec<Ingredient>,
    movements: Vec<StockMovement>,
    orders: BTreeMap<String, Order>,
    display_counter: i64,
    cancellation_audits: Vec<CancellationAudit>,
    price_history: Vec<PriceHistoryEntry>,
    invoice_numbers: Vec<InvoiceNumber>,
    z_reports: Vec<ZReport>,
}

/// In-memory [`EngineStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tenants: DashMap<String, TenantState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the product catalog for a tenant
    pub fn seed_products(&self, tenant: &str, products: Vec<Product>) {
        self.tenants.entry(tenant.to_string()).or_default().products = products;
    }

    /// Seed the ingredient collection for a tenant
    pub fn seed_ingredients(&self, tenant: &str, ingredients: Vec<Ingredient>) {
        self.tenants
            .entry(tenant.to_string())
            .or_default()
            .ingredients = ingredients;
    }

    /// Audit records appended so far (test inspection)
    pub fn cancellation_audits(&self, tenant: &str) -> Vec<CancellationAudit> {
        self.tenants
            .get(tenant)
            .map(|state| state.cancellation_audits.clone())
            .unwrap_or_default()
    }

    fn upsert_ingredients(state: &mut TenantState, updated: &[Ingredient]) {
        for ingredient in updated {
            match state
                .ingredients
                .iter_mut()
                .find(|existing| existing.id == ingredient.id)
            {
                Some(existing) => *existing = ingredient.clone(),
                None => state.ingredients.push(ingredient.clone()),
            }
        }
    }
}

#[async_trait]
impl EngineStore for MemoryStore {
    async fn load_products(&self, tenant: &str) -> AppResult<Vec<Product>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.products.clone())
            .unwrap_or_default())
    }

    async fn load_ingredients(&self, tenant: &str) -> AppResult<Vec<Ingredient>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.ingredients.clone())
            .unwrap_or_default())
    }

    async fn load_movements(&self, tenant: &str) -> AppResult<Vec<StockMovement>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.movements.clone())
            .unwrap_or_default())
    }

    async fn commit_stock(
        &self,
        tenant: &str,
        ingredients: &[Ingredient],
        movements: &[StockMovement],
    ) -> AppResult<()> {
        let mut state = self.tenants.entry(tenant.to_string()).or_default();
        Self::upsert_ingredients(&mut state, ingredients);
        state.movements.extend_from_slice(movements);
        Ok(())
    }

    async fn load_order(&self, tenant: &str, order_id: &str) -> AppResult<Option<Order>> {
        Ok(self
            .tenants
            .get(tenant)
            .and_then(|state| state.orders.get(order_id).cloned()))
    }

    async fn load_orders(&self, tenant: &str) -> AppResult<Vec<Order>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.orders.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn next_display_number(&self, tenant: &str) -> AppResult<i64> {
        let mut state = self.tenants.entry(tenant.to_string()).or_default();
        state.display_counter += 1;
        Ok(state.display_counter)
    }

    async fn commit_order(
        &self,
        tenant: &str,
        order: &Order,
        expected_version: Option<u64>,
        ingredients: &[Ingredient],
        movements: &[StockMovement],
    ) -> AppResult<()> {
        let mut state = self.tenants.entry(tenant.to_string()).or_default();

        match expected_version {
            None => {
                if state.orders.contains_key(&order.id) {
                    return Err(AppError::duplicate(format!("Order {}", order.id)));
                }
            }
            Some(expected) => match state.orders.get(&order.id) {
                None => {
                    return Err(AppError::with_message(
                        ErrorCode::OrderNotFound,
                        format!("Order {} not found", order.id),
                    ));
                }
                Some(stored) if stored.version != expected => {
                    return Err(AppError::with_message(
                        ErrorCode::OrderVersionConflict,
                        format!(
                            "Order {} is at version {}, write expected {}",
                            order.id, stored.version, expected
                        ),
                    )
                    .with_detail("order_id", order.id.clone())
                    .with_detail("stored_version", stored.version)
                    .with_detail("expected_version", expected));
                }
                Some(_) => {}
            },
        }

        state.orders.insert(order.id.clone(), order.clone());
        Self::upsert_ingredients(&mut state, ingredients);
        state.movements.extend_from_slice(movements);
        Ok(())
    }

    async fn replace_orders(&self, tenant: &str, orders: &[Order]) -> AppResult<()> {
        let mut state = self.tenants.entry(tenant.to_string()).or_default();
        state.orders = orders
            .iter()
            .map(|order| (order.id.clone(), order.clone()))
            .collect();
        Ok(())
    }

    async fn commit_completion(
        &self,
        tenant: &str,
        order: &Order,
        expected_version: u64,
        number: &InvoiceNumber,
    ) -> AppResult<()> {
        let mut state = self.tenants.entry(tenant.to_string()).or_default();

        match state.orders.get(&order.id) {
            None => {
                return Err(AppError::with_message(
                    ErrorCode::OrderNotFound,
                    format!("Order {} not found", order.id),
                ));
            }
            Some(stored) if stored.version != expected_version => {
                return Err(AppError::with_message(
                    ErrorCode::OrderVersionConflict,
                    format!(
                        "Order {} is at version {}, write expected {}",
                        order.id, stored.version, expected_version
                    ),
                ));
            }
            Some(_) => {}
        }

        state.orders.insert(order.id.clone(), order.clone());
        state.invoice_numbers.push(*number);
        Ok(())
    }

    async fn append_cancellation_audit(
        &self,
        tenant: &str,
        audit: &CancellationAudit,
    ) -> AppResult<()> {
        self.tenants
            .entry(tenant.to_string())
            .or_default()
            .cancellation_audits
            .push(audit.clone());
        Ok(())
    }

    async fn commit_price_change(
        &self,
        tenant: &str,
        product: &Product,
        entry: &PriceHistoryEntry,
    ) -> AppResult<()> {
        let mut state = self.tenants.entry(tenant.to_string()).or_default();
        match state
            .products
            .iter_mut()
            .find(|existing| existing.id == product.id)
        {
            Some(existing) => *existing = product.clone(),
            None => state.products.push(product.clone()),
        }
        state.price_history.push(entry.clone());
        Ok(())
    }

    async fn load_price_history(&self, tenant: &str) -> AppResult<Vec<PriceHistoryEntry>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.price_history.clone())
            .unwrap_or_default())
    }

    async fn last_completed_sale_at(
        &self,
        tenant: &str,
        product_id: &str,
    ) -> AppResult<Option<i64>> {
        Ok(self.tenants.get(tenant).and_then(|state| {
            state
                .orders
                .values()
                .filter(|order| order.is_completed())
                .filter(|order| {
                    order
                        .items
                        .iter()
                        .any(|item| item.product_id == product_id)
                })
                .filter_map(|order| order.completed_at)
                .max()
        }))
    }

    async fn last_invoice_number(&self, tenant: &str) -> AppResult<Option<InvoiceNumber>> {
        Ok(self
            .tenants
            .get(tenant)
            .and_then(|state| state.invoice_numbers.last().copied()))
    }

    async fn append_invoice_number(&self, tenant: &str, number: &InvoiceNumber) -> AppResult<()> {
        self.tenants
            .entry(tenant.to_string())
            .or_default()
            .invoice_numbers
            .push(*number);
        Ok(())
    }

    async fn load_invoice_numbers(&self, tenant: &str) -> AppResult<Vec<InvoiceNumber>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.invoice_numbers.clone())
            .unwrap_or_default())
    }

    async fn last_z_report(&self, tenant: &str) -> AppResult<Option<ZReport>> {
        Ok(self
            .tenants
            .get(tenant)
            .and_then(|state| state.z_reports.last().cloned()))
    }

    async fn load_z_reports(&self, tenant: &str) -> AppResult<Vec<ZReport>> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|state| state.z_reports.clone())
            .unwrap_or_default())
    }

    async fn archive_z_report(&self, tenant: &str, report: &ZReport) -> AppResult<()> {
        self.tenants
            .entry(tenant.to_string())
            .or_default()
            .z_reports
            .push(report.clone());
        Ok(())
    }
}

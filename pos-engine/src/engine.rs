//! Engine facade
//!
//! Wires the pure core to the collaborator ports and owns the
//! orchestration rules the pure functions document but cannot enforce:
//! order writes carry an optimistic version precondition, stock
//! projections commit atomically with their movements, and Z-report
//! chain appends are serialized per tenant.

use dashmap::DashMap;
use shared::models::{Ingredient, StockMovement, VatBreakdown, ZReport};
use shared::order::{KitchenStatus, Order, OrderItem, OrderItemRequest};
use shared::{AppError, AppResult, ErrorCode};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audit::{chain, invoice};
use crate::config::EngineConfig;
use crate::inventory::{StockIssue, ledger, policy};
use crate::money::{self, to_decimal, to_f64};
use crate::orders::actions::{
    ActionContext, AddItemAction, CancelOrderAction, CompleteOrderAction, MutationOutcome,
    RefundItemsAction, RemoveItemAction, SetKitchenStatusAction, UpdateQuantityAction,
};
use crate::orders::cancellation::{
    self, CancellationAudit, CancellationRequest, cancel_order_with_restock,
};
use crate::orders::merge::merge_orders;
use crate::ports::{AlertSink, Clock, Digest, EngineAlert, EngineStore};
use crate::pricing::guard::{PriceChangeOutcome, PriceChangeRequest};
use crate::pricing::history;
use crate::time;
use crate::validation::{MAX_NOTE_LEN, validate_optional_text};

/// Result of an order mutation through the facade
#[derive(Debug, Clone)]
pub struct MutationResult {
    pub order: Order,
    pub warnings: Vec<StockIssue>,
}

/// Result of a cancellation through the facade
#[derive(Debug, Clone)]
pub struct CancelledOrder {
    pub order: Order,
    pub audit: CancellationAudit,
}

/// Input for the end-of-day closing
#[derive(Debug, Clone)]
pub struct CloseDayInput {
    /// Business date (YYYY-MM-DD); defaults to the current business
    /// day derived from the configured cutoff
    pub business_date: Option<String>,
    pub opening_cash: f64,
    /// Counted cash in the drawer at close
    pub counted_cash: f64,
    pub generated_by: Option<String>,
}

/// The consistency engine
pub struct Engine {
    store: Arc<dyn EngineStore>,
    alerts: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    digest: Arc<dyn Digest>,
    config: EngineConfig,
    /// Per-tenant lock: two reports generated concurrently from the
    /// same predecessor would fork the chain
    chain_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn EngineStore>,
        alerts: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
        digest: Arc<dyn Digest>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            alerts,
            clock,
            digest,
            config,
            chain_locks: DashMap::new(),
        }
    }

    /// Engine with wall clock, SHA-256 digest, tracing alerts, and
    /// default configuration
    pub fn with_defaults(store: Arc<dyn EngineStore>) -> Self {
        Self::new(
            store,
            Arc::new(crate::ports::TracingAlertSink),
            Arc::new(crate::ports::SystemClock),
            Arc::new(crate::ports::Sha256Digest),
            EngineConfig::default(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Create an order from a batch of item requests: policy check,
    /// destock, and the order insert land as one unit.
    pub async fn place_order(
        &self,
        tenant: &str,
        requests: &[OrderItemRequest],
        operator: Option<(&str, &str)>,
    ) -> AppResult<MutationResult> {
        if requests.is_empty() {
            return Err(AppError::validation("order has no items"));
        }
        let products = self.store.load_products(tenant).await?;
        let ingredients = self.store.load_ingredients(tenant).await?;
        let now = self.clock.now_millis();

        let mut items = Vec::with_capacity(requests.len());
        for request in requests {
            money::validate_line_quantity(request.quantity)?;
            validate_optional_text(request.note.as_deref(), "note", MAX_NOTE_LEN)?;
            let product = products
                .iter()
                .find(|p| p.id == request.product_id)
                .ok_or_else(|| AppError::not_found(format!("Product {}", request.product_id)))?;
            items.push(OrderItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: request.quantity,
                unit_price: product.price,
                vat_rate: Some(product.vat_rate),
                note: request.note.clone(),
                refunded: false,
            });
        }

        // The whole batch validates against the cumulative requirement
        let warnings =
            policy::evaluate(self.config.stock_policy, &items, &products, &ingredients)?;

        let order_id = uuid::Uuid::new_v4().to_string();
        let stock = ledger::destock(&items, &products, &ingredients, &order_id, now);

        let display_number = self.store.next_display_number(tenant).await?;
        let mut order = Order::new(order_id, display_number, now);
        order.items = items;
        order.total = money::order_total(&order.items);
        if let Some((operator_id, operator_name)) = operator {
            order.operator_id = Some(operator_id.to_string());
            order.operator_name = Some(operator_name.to_string());
        }

        let changed = changed_ingredients(&stock.ingredients, &stock.movements);
        self.store
            .commit_order(tenant, &order, None, &changed, &stock.movements)
            .await?;

        tracing::info!(
            tenant,
            order_id = %order.id,
            display_number,
            total = order.total,
            "order placed"
        );
        self.raise_stock_alerts(tenant, &order.id, &warnings, &changed)
            .await;

        Ok(MutationResult { order, warnings })
    }

    /// Load an order, run one mutation action against current
    /// snapshots, and commit with the optimistic version precondition.
    async fn run_action<F>(&self, tenant: &str, order_id: &str, action: F) -> AppResult<MutationResult>
    where
        F: FnOnce(&Order, &ActionContext<'_>) -> AppResult<MutationOutcome>,
    {
        let order = self
            .store
            .load_order(tenant, order_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderNotFound,
                    format!("Order {} not found", order_id),
                )
            })?;
        let products = self.store.load_products(tenant).await?;
        let ingredients = self.store.load_ingredients(tenant).await?;

        let ctx = ActionContext {
            products: &products,
            ingredients: &ingredients,
            policy: self.config.stock_policy,
            now: self.clock.now_millis(),
        };
        let outcome = action(&order, &ctx)?;

        let changed = changed_ingredients(&outcome.ingredients, &outcome.movements);
        self.store
            .commit_order(
                tenant,
                &outcome.order,
                Some(order.version),
                &changed,
                &outcome.movements,
            )
            .await?;

        self.raise_stock_alerts(tenant, order_id, &outcome.warnings, &changed)
            .await;

        Ok(MutationResult {
            order: outcome.order,
            warnings: outcome.warnings,
        })
    }

    pub async fn add_item(
        &self,
        tenant: &str,
        order_id: &str,
        request: OrderItemRequest,
    ) -> AppResult<MutationResult> {
        self.run_action(tenant, order_id, |order, ctx| {
            AddItemAction {
                product_id: request.product_id.clone(),
                quantity: request.quantity,
                note: request.note.clone(),
            }
            .execute(order, ctx)
        })
        .await
    }

    pub async fn remove_item(
        &self,
        tenant: &str,
        order_id: &str,
        item_index: usize,
    ) -> AppResult<MutationResult> {
        self.run_action(tenant, order_id, |order, ctx| {
            RemoveItemAction { item_index }.execute(order, ctx)
        })
        .await
    }

    pub async fn update_quantity(
        &self,
        tenant: &str,
        order_id: &str,
        item_index: usize,
        quantity: i32,
    ) -> AppResult<MutationResult> {
        self.run_action(tenant, order_id, |order, ctx| {
            UpdateQuantityAction {
                item_index,
                quantity,
            }
            .execute(order, ctx)
        })
        .await
    }

    pub async fn set_kitchen_status(
        &self,
        tenant: &str,
        order_id: &str,
        kitchen_status: KitchenStatus,
    ) -> AppResult<MutationResult> {
        self.run_action(tenant, order_id, |order, ctx| {
            SetKitchenStatusAction { kitchen_status }.execute(order, ctx)
        })
        .await
    }

    pub async fn refund_items(
        &self,
        tenant: &str,
        order_id: &str,
        item_indices: Vec<usize>,
    ) -> AppResult<MutationResult> {
        self.run_action(tenant, order_id, |order, ctx| {
            RefundItemsAction { item_indices }.execute(order, ctx)
        })
        .await
    }

    /// Complete an order, assigning the next invoice number. The order
    /// write and the number append are one atomic unit at the store so
    /// the sequence can never gap or repeat.
    pub async fn complete_order(
        &self,
        tenant: &str,
        order_id: &str,
        payment_method: &str,
    ) -> AppResult<Order> {
        let order = self
            .store
            .load_order(tenant, order_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderNotFound,
                    format!("Order {} not found", order_id),
                )
            })?;
        let now = self.clock.now_millis();

        let last = self.store.last_invoice_number(tenant).await?;
        let number = invoice::next_invoice_number(last, time::year_of(now, self.config.tz()));

        let ctx = ActionContext {
            products: &[],
            ingredients: &[],
            policy: self.config.stock_policy,
            now,
        };
        let outcome = CompleteOrderAction {
            payment_method: payment_method.to_string(),
            invoice_number: number.formatted(),
        }
        .execute(&order, &ctx)?;

        self.store
            .commit_completion(tenant, &outcome.order, order.version, &number)
            .await?;

        tracing::info!(
            tenant,
            order_id,
            invoice = %number,
            payment_method,
            "order completed"
        );
        Ok(outcome.order)
    }

    /// Simple cancellation for orders that were never paid. Flips the
    /// order without restock or audit; stock-consistent callers use
    /// [`cancel_order`](Engine::cancel_order) instead.
    pub async fn void_order(&self, tenant: &str, order_id: &str) -> AppResult<MutationResult> {
        self.run_action(tenant, order_id, |order, ctx| {
            CancelOrderAction.execute(order, ctx)
        })
        .await
    }

    /// Whole-order cancellation with restock and audit record.
    pub async fn cancel_order(
        &self,
        tenant: &str,
        order_id: &str,
        request: CancellationRequest,
    ) -> AppResult<CancelledOrder> {
        let order = self
            .store
            .load_order(tenant, order_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::OrderNotFound,
                    format!("Order {} not found", order_id),
                )
            })?;
        let products = self.store.load_products(tenant).await?;
        let ingredients = self.store.load_ingredients(tenant).await?;
        let now = self.clock.now_millis();

        let outcome = cancel_order_with_restock(
            &order,
            &request,
            &products,
            &ingredients,
            &self.config,
            now,
        )?;
        // Status flip lands in the same commit as the restock
        let cancelled = cancellation::apply_cancellation(&order, now);

        let changed = changed_ingredients(&outcome.ingredients, &outcome.movements);
        self.store
            .commit_order(
                tenant,
                &cancelled,
                Some(order.version),
                &changed,
                &outcome.movements,
            )
            .await?;
        self.store
            .append_cancellation_audit(tenant, &outcome.audit)
            .await?;

        self.alerts
            .notify(EngineAlert::OrderCancelled {
                tenant: tenant.to_string(),
                order_id: order_id.to_string(),
                actor_id: request.actor_id.clone(),
                reason: request.reason.clone(),
            })
            .await;

        Ok(CancelledOrder {
            order: cancelled,
            audit: outcome.audit,
        })
    }

    /// Reconcile a remote order set (offline device) into the local
    /// one and persist the merged result.
    pub async fn merge_order_sets(&self, tenant: &str, remote: &[Order]) -> AppResult<Vec<Order>> {
        let local = self.store.load_orders(tenant).await?;
        let merged = merge_orders(&local, remote);
        self.store.replace_orders(tenant, &merged).await?;
        tracing::info!(
            tenant,
            local = local.len(),
            remote = remote.len(),
            merged = merged.len(),
            "order sets reconciled"
        );
        Ok(merged)
    }

    // ========================================================================
    // Stock
    // ========================================================================

    pub async fn receive_stock(
        &self,
        tenant: &str,
        ingredient_id: &str,
        quantity: f64,
        unit_cost: f64,
        document_ref: &str,
    ) -> AppResult<Ingredient> {
        let ingredients = self.store.load_ingredients(tenant).await?;
        let ingredient = find_ingredient(&ingredients, ingredient_id)?;
        let (updated, movement) = ledger::receive_stock(
            ingredient,
            quantity,
            unit_cost,
            document_ref,
            self.clock.now_millis(),
        )?;
        self.store
            .commit_stock(tenant, std::slice::from_ref(&updated), &[movement])
            .await?;
        Ok(updated)
    }

    pub async fn record_waste(
        &self,
        tenant: &str,
        ingredient_id: &str,
        quantity: f64,
        document_ref: &str,
    ) -> AppResult<Ingredient> {
        let ingredients = self.store.load_ingredients(tenant).await?;
        let ingredient = find_ingredient(&ingredients, ingredient_id)?;
        let (updated, movement) = ledger::record_waste(
            ingredient,
            quantity,
            document_ref,
            self.clock.now_millis(),
        )?;
        self.store
            .commit_stock(tenant, std::slice::from_ref(&updated), &[movement])
            .await?;
        self.raise_stock_alerts(tenant, document_ref, &[], std::slice::from_ref(&updated))
            .await;
        Ok(updated)
    }

    pub async fn adjust_stock(
        &self,
        tenant: &str,
        ingredient_id: &str,
        counted_quantity: f64,
        document_ref: &str,
    ) -> AppResult<Ingredient> {
        let ingredients = self.store.load_ingredients(tenant).await?;
        let ingredient = find_ingredient(&ingredients, ingredient_id)?;
        let (updated, movement) = ledger::adjust_stock(
            ingredient,
            counted_quantity,
            document_ref,
            self.clock.now_millis(),
        )?;
        if let Some(movement) = movement {
            self.store
                .commit_stock(tenant, std::slice::from_ref(&updated), &[movement])
                .await?;
        }
        Ok(updated)
    }

    /// Material cost of one unit of a product at current average costs
    pub async fn product_cost(&self, tenant: &str, product_id: &str) -> AppResult<f64> {
        let products = self.store.load_products(tenant).await?;
        let ingredients = self.store.load_ingredients(tenant).await?;
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {}", product_id)))?;
        Ok(crate::inventory::costing::product_cost(product, &ingredients))
    }

    // ========================================================================
    // Pricing
    // ========================================================================

    pub async fn change_price(
        &self,
        tenant: &str,
        product_id: &str,
        request: PriceChangeRequest,
    ) -> AppResult<PriceChangeOutcome> {
        let products = self.store.load_products(tenant).await?;
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {}", product_id)))?;
        let last_sale = self.store.last_completed_sale_at(tenant, product_id).await?;

        let outcome = crate::pricing::guard::change_price(
            product,
            &request,
            last_sale,
            &self.config,
            self.clock.now_millis(),
        )?;
        self.store
            .commit_price_change(tenant, &outcome.product, &outcome.entry)
            .await?;

        if let Some(warning) = &outcome.swing_warning {
            self.alerts
                .notify(EngineAlert::LargePriceSwing {
                    tenant: tenant.to_string(),
                    warning: warning.clone(),
                })
                .await;
        }
        Ok(outcome)
    }

    /// Price of a product as of a point in time
    pub async fn price_at(&self, tenant: &str, product_id: &str, at: i64) -> AppResult<f64> {
        let products = self.store.load_products(tenant).await?;
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::not_found(format!("Product {}", product_id)))?;
        let entries = self.store.load_price_history(tenant).await?;
        Ok(history::price_at(&entries, product, at))
    }

    // ========================================================================
    // Audit trail
    // ========================================================================

    /// Generate and archive the closing report for a business day.
    /// Appends are serialized per tenant.
    pub async fn close_day(&self, tenant: &str, input: CloseDayInput) -> AppResult<ZReport> {
        let lock = self.chain_lock(tenant);
        let _guard = lock.lock().await;

        let now = self.clock.now_millis();
        let tz = self.config.tz();
        let cutoff = time::parse_cutoff(&self.config.business_day_cutoff);
        let date = match &input.business_date {
            Some(raw) => time::parse_date(raw)?,
            None => time::current_business_date(now, cutoff, tz),
        };
        let business_date = date.format("%Y-%m-%d").to_string();

        let existing = self.store.load_z_reports(tenant).await?;
        if existing.iter().any(|r| r.business_date == business_date) {
            return Err(AppError::duplicate(format!("Z report for {}", business_date)));
        }

        let start = time::day_start_millis(date, tz);
        let end = time::day_end_millis(date, tz);
        let orders = self.store.load_orders(tenant).await?;
        let day_orders: Vec<&Order> = orders
            .iter()
            .filter(|order| order.is_completed())
            .filter(|order| {
                order
                    .completed_at
                    .map(|at| at >= start && at < end)
                    .unwrap_or(false)
            })
            .collect();

        let draft = build_draft(&day_orders, &business_date, &input);
        let previous = self.store.last_z_report(tenant).await?;
        let report = chain::chain_report(draft, previous.as_ref(), self.digest.as_ref(), now).await?;

        self.store.archive_z_report(tenant, &report).await?;
        tracing::info!(
            tenant,
            business_date = %report.business_date,
            sequence_number = report.sequence_number,
            total_sales = report.total_sales,
            "closing report archived"
        );
        Ok(report)
    }

    /// Recompute the report chain and compare against stored hashes
    pub async fn verify_reports(&self, tenant: &str) -> AppResult<chain::ChainVerification> {
        let reports = self.store.load_z_reports(tenant).await?;
        chain::verify_chain(&reports, self.digest.as_ref()).await
    }

    /// Check the stored invoice sequence for gaps and duplicates
    pub async fn validate_invoices(&self, tenant: &str) -> AppResult<invoice::SequenceValidation> {
        let numbers = self.store.load_invoice_numbers(tenant).await?;
        Ok(invoice::validate_invoice_sequence(&numbers))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn chain_lock(&self, tenant: &str) -> Arc<Mutex<()>> {
        self.chain_locks
            .entry(tenant.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Fire-and-forget observability; never fails the business operation.
    async fn raise_stock_alerts(
        &self,
        tenant: &str,
        document_ref: &str,
        warnings: &[StockIssue],
        changed: &[Ingredient],
    ) {
        if !warnings.is_empty() {
            self.alerts
                .notify(EngineAlert::StockShortage {
                    tenant: tenant.to_string(),
                    document_ref: document_ref.to_string(),
                    issues: warnings.to_vec(),
                })
                .await;
        }
        for ingredient in changed.iter().filter(|ing| ing.is_below_minimum()) {
            self.alerts
                .notify(EngineAlert::LowStock {
                    tenant: tenant.to_string(),
                    ingredient_id: ingredient.id.clone(),
                    ingredient_name: ingredient.name.clone(),
                    stock: ingredient.stock,
                    minimum_stock: ingredient.minimum_stock,
                })
                .await;
        }
    }
}

/// Only the ingredients a movement touched need committing
fn changed_ingredients(all: &[Ingredient], movements: &[StockMovement]) -> Vec<Ingredient> {
    all.iter()
        .filter(|ingredient| movements.iter().any(|m| m.ingredient_id == ingredient.id))
        .cloned()
        .collect()
}

fn find_ingredient<'a>(ingredients: &'a [Ingredient], id: &str) -> AppResult<&'a Ingredient> {
    ingredients
        .iter()
        .find(|ing| ing.id == id)
        .ok_or_else(|| AppError::not_found(format!("Ingredient {}", id)))
}

/// Aggregate a day's completed orders into a report draft
fn build_draft(
    orders: &[&Order],
    business_date: &str,
    input: &CloseDayInput,
) -> chain::ZReportDraft {
    use rust_decimal::Decimal;

    let mut total_sales = Decimal::ZERO;
    let mut cash_total = Decimal::ZERO;
    let mut card_total = Decimal::ZERO;
    // vat_rate → (net, vat, gross, line count)
    let mut vat: BTreeMap<i32, (Decimal, Decimal, Decimal, i64)> = BTreeMap::new();
    // operator_id → (name, order count, sales)
    let mut staff: BTreeMap<String, (String, i64, Decimal)> = BTreeMap::new();

    for order in orders {
        let total = to_decimal(order.total);
        total_sales += total;
        let is_cash = order
            .payment_method
            .as_deref()
            .is_some_and(|method| method.eq_ignore_ascii_case("cash"));
        if is_cash {
            cash_total += total;
        } else {
            card_total += total;
        }

        for item in order.active_items() {
            let rate = item.vat_rate.unwrap_or(0);
            let gross = to_decimal(item.line_total());
            let divisor = Decimal::ONE + Decimal::from(rate) / Decimal::from(100);
            let net = money::round_money(gross / divisor);
            let entry = vat
                .entry(rate)
                .or_insert((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, 0));
            entry.0 += net;
            entry.1 += gross - net;
            entry.2 += gross;
            entry.3 += 1;
        }

        let operator_id = order
            .operator_id
            .clone()
            .unwrap_or_else(|| "unassigned".to_string());
        let operator_name = order
            .operator_name
            .clone()
            .unwrap_or_else(|| operator_id.clone());
        let entry = staff
            .entry(operator_id)
            .or_insert((operator_name, 0, Decimal::ZERO));
        entry.1 += 1;
        entry.2 += total;
    }

    chain::ZReportDraft {
        business_date: business_date.to_string(),
        order_count: orders.len() as i64,
        total_sales: to_f64(money::round_money(total_sales)),
        cash_total: to_f64(money::round_money(cash_total)),
        card_total: to_f64(money::round_money(card_total)),
        opening_cash: input.opening_cash,
        closing_cash: input.counted_cash,
        vat_breakdowns: vat
            .into_iter()
            .map(|(rate, (net, tax, gross, count))| VatBreakdown {
                vat_rate: rate,
                net_amount: to_f64(money::round_money(net)),
                vat_amount: to_f64(money::round_money(tax)),
                gross_amount: to_f64(money::round_money(gross)),
                line_count: count,
            })
            .collect(),
        staff_breakdowns: staff
            .into_iter()
            .map(|(id, (name, count, sales))| shared::models::StaffBreakdown {
                operator_id: id,
                operator_name: name,
                order_count: count,
                total_sales: to_f64(money::round_money(sales)),
            })
            .collect(),
        generated_by: input.generated_by.clone(),
    }
}

use crate::models::{Admin, Customer, Order, OrderStatus, Service};
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use site_core::error::AppError;
use uuid::Uuid;

#[derive(Clone)]
pub struct StoreRepository {
    customer_collection: Collection<Customer>,
    admin_collection: Collection<Admin>,
    service_collection: Collection<Service>,
    order_collection: Collection<Order>,
}

impl StoreRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            customer_collection: db.collection("customers"),
            admin_collection: db.collection("admins"),
            service_collection: db.collection("services"),
            order_collection: db.collection("orders"),
        }
    }

    /// Initialize database indexes.
    pub async fn init_indexes(&self) -> Result<()> {
        // Unique index on normalized email; backs the case-normalized
        // uniqueness invariant and makes concurrent duplicate signups fail.
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("customer_email_unique_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.customer_collection
            .create_indexes([email_index], None)
            .await?;

        let slug_index = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(
                IndexOptions::builder()
                    .name("service_slug_unique_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.service_collection
            .create_indexes([slug_index], None)
            .await?;

        // Sparse because orders only get a gateway id once the intent exists.
        let gateway_order_index = IndexModel::builder()
            .keys(doc! { "gateway_order_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("order_gateway_id_idx".to_string())
                    .unique(true)
                    .sparse(true)
                    .build(),
            )
            .build();

        // Compound index for customer-scoped order listings.
        let customer_order_index = IndexModel::builder()
            .keys(doc! { "customer_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("customer_order_idx".to_string())
                    .build(),
            )
            .build();

        let status_index = IndexModel::builder()
            .keys(doc! { "status": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("order_status_idx".to_string())
                    .build(),
            )
            .build();

        self.order_collection
            .create_indexes([gateway_order_index, customer_order_index, status_index], None)
            .await?;

        tracing::info!("Storefront indexes initialized");
        Ok(())
    }

    // --- customers ---

    pub async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let filter = doc! { "email": email };
        let customer = self.customer_collection.find_one(filter, None).await?;
        Ok(customer)
    }

    /// Insert a new customer; a concurrent duplicate signup surfaces as
    /// `Conflict` via the unique email index.
    pub async fn create_customer(&self, customer: Customer) -> Result<(), AppError> {
        self.customer_collection
            .insert_one(customer, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::Conflict(anyhow::anyhow!("Email already registered"))
                } else {
                    AppError::from(e)
                }
            })?;
        Ok(())
    }

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let filter = doc! { "email": email };
        let admin = self.admin_collection.find_one(filter, None).await?;
        Ok(admin)
    }

    // --- catalog ---

    pub async fn find_service_by_slug(&self, slug: &str) -> Result<Option<Service>> {
        let filter = doc! { "slug": slug, "active": true };
        let service = self.service_collection.find_one(filter, None).await?;
        Ok(service)
    }

    // --- orders ---

    pub async fn create_order(&self, order: Order) -> Result<()> {
        self.order_collection.insert_one(order, None).await?;
        Ok(())
    }

    pub async fn set_gateway_order_id(&self, id: Uuid, gateway_order_id: &str) -> Result<()> {
        let filter = doc! { "_id": id.to_string() };
        let update = doc! {
            "$set": {
                "gateway_order_id": gateway_order_id,
                "updated_at": mongodb::bson::DateTime::now()
            }
        };
        self.order_collection.update_one(filter, update, None).await?;
        Ok(())
    }

    pub async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
        let filter = doc! { "_id": id.to_string() };
        let order = self.order_collection.find_one(filter, None).await?;
        Ok(order)
    }

    /// Find an order by id within the caller's scope. Absent and
    /// other-customer orders are indistinguishable to the caller.
    pub async fn find_order_for_customer(
        &self,
        customer_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Order>> {
        let filter = doc! {
            "_id": id.to_string(),
            "customer_id": customer_id.to_string()
        };
        let order = self.order_collection.find_one(filter, None).await?;
        Ok(order)
    }

    pub async fn find_order_by_gateway_id(&self, gateway_order_id: &str) -> Result<Option<Order>> {
        let filter = doc! { "gateway_order_id": gateway_order_id };
        let order = self.order_collection.find_one(filter, None).await?;
        Ok(order)
    }

    pub async fn list_orders_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>> {
        let filter = doc! { "customer_id": customer_id.to_string() };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self.order_collection.find(filter, Some(options)).await?;
        let orders: Vec<Order> = cursor.try_collect().await?;
        Ok(orders)
    }

    /// Admin-side listing with optional status filter and pagination.
    pub async fn list_orders(
        &self,
        status_filter: Option<OrderStatus>,
        limit: i64,
        offset: u64,
    ) -> Result<(Vec<Order>, i64)> {
        let mut filter = doc! {};
        if let Some(status) = status_filter {
            filter.insert("status", mongodb::bson::to_bson(&status)?);
        }

        let total_count = self
            .order_collection
            .count_documents(filter.clone(), None)
            .await? as i64;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(offset)
            .limit(limit)
            .build();

        let cursor = self.order_collection.find(filter, Some(options)).await?;
        let orders: Vec<Order> = cursor.try_collect().await?;

        Ok((orders, total_count))
    }

    /// Apply the `Pending -> Paid` transition conditionally.
    ///
    /// The status guard in the filter means two racing verifications cannot
    /// both apply it: the loser matches zero documents and must re-read.
    pub async fn mark_paid(&self, id: Uuid, gateway_payment_id: &str) -> Result<bool> {
        let filter = doc! {
            "_id": id.to_string(),
            "status": mongodb::bson::to_bson(&OrderStatus::Pending)?
        };
        let update = doc! {
            "$set": {
                "status": mongodb::bson::to_bson(&OrderStatus::Paid)?,
                "gateway_payment_id": gateway_payment_id,
                "updated_at": mongodb::bson::DateTime::now()
            }
        };
        let result = self.order_collection.update_one(filter, update, None).await?;
        Ok(result.matched_count > 0)
    }

    /// Webhook variant of [`mark_paid`], keyed by gateway order id. The
    /// payment id may be absent for `order.paid` events.
    pub async fn mark_paid_by_gateway_id(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: Option<&str>,
    ) -> Result<bool> {
        let filter = doc! {
            "gateway_order_id": gateway_order_id,
            "status": mongodb::bson::to_bson(&OrderStatus::Pending)?
        };
        let mut set = doc! {
            "status": mongodb::bson::to_bson(&OrderStatus::Paid)?,
            "updated_at": mongodb::bson::DateTime::now()
        };
        if let Some(payment_id) = gateway_payment_id {
            set.insert("gateway_payment_id", payment_id);
        }
        let result = self
            .order_collection
            .update_one(filter, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Admin status change, conditional on the status the operator saw.
    pub async fn update_order_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        admin_notes: Option<&str>,
    ) -> Result<bool> {
        let filter = doc! {
            "_id": id.to_string(),
            "status": mongodb::bson::to_bson(&from)?
        };
        let mut set = doc! {
            "status": mongodb::bson::to_bson(&to)?,
            "updated_at": mongodb::bson::DateTime::now()
        };
        if let Some(notes) = admin_notes {
            set.insert("admin_notes", notes);
        }
        let result = self
            .order_collection
            .update_one(filter, doc! { "$set": set }, None)
            .await?;
        Ok(result.matched_count > 0)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

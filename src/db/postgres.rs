use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use super::Store;
use crate::error::SalonResult;
use crate::models::{
    Admin, Appointment, AppointmentPatch, BusinessExpense, Client, ClientInput, Consultation,
    ExpenseInput, NewAppointment, NewConsultation, NewServiceRecipe, Product, ProductInput,
    ProductLine, Service, ServiceInput, ServiceRecipe, Supplier, SupplierInput,
};

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ConsultationProductRow {
    consultation_id: i32,
    product_id: i32,
    quantity: i32,
}

impl PgStore {
    /// Create a new store with a connection pool
    pub async fn connect(database_url: &str) -> SalonResult<Self> {
        let options = PgConnectOptions::from_str(database_url)?
            .log_statements(log::LevelFilter::Debug);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        tracing::info!("Database connection established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> SalonResult<()> {
        sqlx::migrate!("./migrations").run(self.get_pool()).await?;
        Ok(())
    }

    async fn load_product_lines(&self, consultations: &mut [Consultation]) -> SalonResult<()> {
        let ids: Vec<i32> = consultations.iter().map(|c| c.id).collect();
        let rows = sqlx::query_as::<_, ConsultationProductRow>(
            "SELECT consultation_id, product_id, quantity FROM consultation_products
             WHERE consultation_id = ANY($1) ORDER BY id ASC",
        )
        .bind(&ids)
        .fetch_all(self.get_pool())
        .await?;

        let mut by_consultation: HashMap<i32, Vec<ProductLine>> = HashMap::new();
        for row in rows {
            by_consultation
                .entry(row.consultation_id)
                .or_default()
                .push(ProductLine {
                    product_id: row.product_id,
                    quantity: row.quantity,
                });
        }

        for consultation in consultations.iter_mut() {
            consultation.products = by_consultation.remove(&consultation.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    // Admin operations
    async fn find_admin(&self, username: &str) -> SalonResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(self.get_pool())
            .await?;
        Ok(admin)
    }

    async fn count_admins(&self) -> SalonResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(self.get_pool())
            .await?;
        Ok(count)
    }

    async fn insert_admin(&self, username: &str, password: &str) -> SalonResult<Admin> {
        let admin = sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (username, password) VALUES ($1, $2) RETURNING *",
        )
        .bind(username)
        .bind(password)
        .fetch_one(self.get_pool())
        .await?;
        Ok(admin)
    }

    async fn set_admin_password(&self, id: i32, password: &str) -> SalonResult<bool> {
        let result = sqlx::query("UPDATE admins SET password = $1 WHERE id = $2")
            .bind(password)
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Service operations
    async fn list_services(&self) -> SalonResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;
        Ok(services)
    }

    async fn get_service(&self, id: i32) -> SalonResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;
        Ok(service)
    }

    async fn insert_service(&self, input: &ServiceInput) -> SalonResult<Service> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, category, price, duration_minutes, description, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.category.as_str())
        .bind(input.price)
        .bind(input.duration_minutes)
        .bind(&input.description)
        .bind(input.active)
        .fetch_one(self.get_pool())
        .await?;
        Ok(service)
    }

    async fn update_service(&self, id: i32, input: &ServiceInput) -> SalonResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $1, category = $2, price = $3, duration_minutes = $4,
                description = $5, active = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.category.as_str())
        .bind(input.price)
        .bind(input.duration_minutes)
        .bind(&input.description)
        .bind(input.active)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(service)
    }

    async fn delete_service(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Supplier operations
    async fn list_suppliers(&self) -> SalonResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: i32) -> SalonResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;
        Ok(supplier)
    }

    async fn insert_supplier(&self, input: &SupplierInput) -> SalonResult<Supplier> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "INSERT INTO suppliers (name, phone, email, notes) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.notes)
        .fetch_one(self.get_pool())
        .await?;
        Ok(supplier)
    }

    async fn update_supplier(&self, id: i32, input: &SupplierInput) -> SalonResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, phone = $2, email = $3, notes = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.notes)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(supplier)
    }

    async fn delete_supplier(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Product operations
    async fn list_products(&self) -> SalonResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;
        Ok(products)
    }

    async fn get_product(&self, id: i32) -> SalonResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;
        Ok(product)
    }

    async fn insert_product(&self, input: &ProductInput) -> SalonResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, stock_quantity, buy_price, supplier_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.stock_quantity)
        .bind(input.buy_price)
        .bind(input.supplier_id)
        .fetch_one(self.get_pool())
        .await?;
        Ok(product)
    }

    async fn update_product(&self, id: i32, input: &ProductInput) -> SalonResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $1, stock_quantity = $2, buy_price = $3, supplier_id = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.stock_quantity)
        .bind(input.buy_price)
        .bind(input.supplier_id)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(product)
    }

    async fn set_product_stock(&self, id: i32, stock_quantity: i32) -> SalonResult<bool> {
        let result = sqlx::query("UPDATE products SET stock_quantity = $1 WHERE id = $2")
            .bind(stock_quantity)
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Service recipe operations
    async fn list_recipes(&self) -> SalonResult<Vec<ServiceRecipe>> {
        let recipes = sqlx::query_as::<_, ServiceRecipe>(
            "SELECT * FROM service_recipes ORDER BY service_id ASC, id ASC",
        )
        .fetch_all(self.get_pool())
        .await?;
        Ok(recipes)
    }

    async fn insert_recipe(&self, recipe: &NewServiceRecipe) -> SalonResult<ServiceRecipe> {
        let recipe = sqlx::query_as::<_, ServiceRecipe>(
            r#"
            INSERT INTO service_recipes (service_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(recipe.service_id)
        .bind(recipe.product_id)
        .bind(recipe.quantity)
        .fetch_one(self.get_pool())
        .await?;
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM service_recipes WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Client operations
    async fn list_clients(&self) -> SalonResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;
        Ok(clients)
    }

    async fn get_client(&self, id: i32) -> SalonResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;
        Ok(client)
    }

    async fn find_client_by_phone(&self, phone: &str) -> SalonResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE phone = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(client)
    }

    async fn insert_client(&self, input: &ClientInput) -> SalonResult<Client> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, phone, email, instagram, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.instagram)
        .bind(&input.notes)
        .fetch_one(self.get_pool())
        .await?;
        Ok(client)
    }

    async fn update_client(&self, id: i32, input: &ClientInput) -> SalonResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $1, phone = $2, email = $3, instagram = $4, notes = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.instagram)
        .bind(&input.notes)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(client)
    }

    async fn delete_client(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Appointment operations
    async fn list_appointments(&self) -> SalonResult<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments ORDER BY date DESC, time DESC, id DESC",
        )
        .fetch_all(self.get_pool())
        .await?;
        Ok(appointments)
    }

    async fn list_appointments_on(&self, date: NaiveDate) -> SalonResult<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE date = $1 ORDER BY time ASC, id ASC",
        )
        .bind(date)
        .fetch_all(self.get_pool())
        .await?;
        Ok(appointments)
    }

    async fn get_appointment(&self, id: i32) -> SalonResult<Option<Appointment>> {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
                .bind(id)
                .fetch_optional(self.get_pool())
                .await?;
        Ok(appointment)
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> SalonResult<Appointment> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (client_id, service_ids, date, time, status, notes, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(appointment.client_id)
        .bind(&appointment.service_ids)
        .bind(appointment.date)
        .bind(&appointment.time)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(&appointment.message)
        .fetch_one(self.get_pool())
        .await?;
        Ok(appointment)
    }

    async fn patch_appointment(
        &self,
        id: i32,
        patch: &AppointmentPatch,
    ) -> SalonResult<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET date = COALESCE($1, date),
                time = COALESCE($2, time),
                service_ids = COALESCE($3, service_ids),
                status = COALESCE($4, status),
                notes = COALESCE($5, notes)
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(patch.date)
        .bind(&patch.time)
        .bind(&patch.service_ids)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(&patch.notes)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Consultation operations
    async fn list_consultations(&self) -> SalonResult<Vec<Consultation>> {
        let mut consultations = sqlx::query_as::<_, Consultation>(
            "SELECT * FROM consultations ORDER BY date DESC, id DESC",
        )
        .fetch_all(self.get_pool())
        .await?;
        self.load_product_lines(&mut consultations).await?;
        Ok(consultations)
    }

    async fn get_consultation(&self, id: i32) -> SalonResult<Option<Consultation>> {
        let consultation =
            sqlx::query_as::<_, Consultation>("SELECT * FROM consultations WHERE id = $1")
                .bind(id)
                .fetch_optional(self.get_pool())
                .await?;

        match consultation {
            Some(consultation) => {
                let mut found = [consultation];
                self.load_product_lines(&mut found).await?;
                let [consultation] = found;
                Ok(Some(consultation))
            }
            None => Ok(None),
        }
    }

    async fn insert_consultation(&self, consultation: &NewConsultation) -> SalonResult<Consultation> {
        // The receipt and its lines form one record; the rest of the completion workflow is not
        // part of this transaction.
        let mut tx = self.pool.begin().await?;

        let mut stored = sqlx::query_as::<_, Consultation>(
            r#"
            INSERT INTO consultations (appointment_id, client_id, amount, payment_method, date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(consultation.appointment_id)
        .bind(consultation.client_id)
        .bind(consultation.amount)
        .bind(consultation.payment_method.as_str())
        .bind(consultation.date)
        .bind(&consultation.notes)
        .fetch_one(&mut *tx)
        .await?;

        for line in &consultation.products {
            sqlx::query(
                r#"
                INSERT INTO consultation_products (consultation_id, product_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(stored.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        stored.products = consultation.products.clone();
        Ok(stored)
    }

    async fn delete_consultation(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM consultations WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Business expense operations
    async fn list_expenses(&self) -> SalonResult<Vec<BusinessExpense>> {
        let expenses = sqlx::query_as::<_, BusinessExpense>(
            "SELECT * FROM business_expenses ORDER BY date DESC, id DESC",
        )
        .fetch_all(self.get_pool())
        .await?;
        Ok(expenses)
    }

    async fn get_expense(&self, id: i32) -> SalonResult<Option<BusinessExpense>> {
        let expense =
            sqlx::query_as::<_, BusinessExpense>("SELECT * FROM business_expenses WHERE id = $1")
                .bind(id)
                .fetch_optional(self.get_pool())
                .await?;
        Ok(expense)
    }

    async fn insert_expense(&self, input: &ExpenseInput) -> SalonResult<BusinessExpense> {
        let expense = sqlx::query_as::<_, BusinessExpense>(
            r#"
            INSERT INTO business_expenses (description, amount, category, date, supplier_id, product_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.category.as_str())
        .bind(input.date)
        .bind(input.supplier_id)
        .bind(input.product_id)
        .fetch_one(self.get_pool())
        .await?;
        Ok(expense)
    }

    async fn update_expense(
        &self,
        id: i32,
        input: &ExpenseInput,
    ) -> SalonResult<Option<BusinessExpense>> {
        let expense = sqlx::query_as::<_, BusinessExpense>(
            r#"
            UPDATE business_expenses
            SET description = $1, amount = $2, category = $3, date = $4,
                supplier_id = $5, product_id = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.category.as_str())
        .bind(input.date)
        .bind(input.supplier_id)
        .bind(input.product_id)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;
        Ok(expense)
    }

    async fn delete_expense(&self, id: i32) -> SalonResult<bool> {
        let result = sqlx::query("DELETE FROM business_expenses WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

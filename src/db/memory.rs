use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::Store;
use crate::error::SalonResult;
use crate::models::{
    Admin, Appointment, AppointmentPatch, BusinessExpense, Client, ClientInput, Consultation,
    ExpenseInput, NewAppointment, NewConsultation, NewServiceRecipe, Product, ProductInput,
    Service, ServiceInput, ServiceRecipe, Supplier, SupplierInput,
};

#[derive(Default)]
struct Collections {
    next_id: i32,
    admins: Vec<Admin>,
    services: Vec<Service>,
    suppliers: Vec<Supplier>,
    products: Vec<Product>,
    service_recipes: Vec<ServiceRecipe>,
    clients: Vec<Client>,
    appointments: Vec<Appointment>,
    consultations: Vec<Consultation>,
    business_expenses: Vec<BusinessExpense>,
}

impl Collections {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store with the same ordering and semantics as the PostgreSQL store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remove_by_id<T>(records: &mut Vec<T>, id: i32, id_of: impl Fn(&T) -> i32) -> bool {
    let before = records.len();
    records.retain(|r| id_of(r) != id);
    records.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    // Admin operations
    async fn find_admin(&self, username: &str) -> SalonResult<Option<Admin>> {
        Ok(self.lock().admins.iter().find(|a| a.username == username).cloned())
    }

    async fn count_admins(&self) -> SalonResult<i64> {
        Ok(self.lock().admins.len() as i64)
    }

    async fn insert_admin(&self, username: &str, password: &str) -> SalonResult<Admin> {
        let mut data = self.lock();
        let admin = Admin {
            id: data.next_id(),
            username: username.to_string(),
            password: password.to_string(),
            created_at: Utc::now(),
        };
        data.admins.push(admin.clone());
        Ok(admin)
    }

    async fn set_admin_password(&self, id: i32, password: &str) -> SalonResult<bool> {
        let mut data = self.lock();
        match data.admins.iter_mut().find(|a| a.id == id) {
            Some(admin) => {
                admin.password = password.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // Service operations
    async fn list_services(&self) -> SalonResult<Vec<Service>> {
        let mut services = self.lock().services.clone();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, id: i32) -> SalonResult<Option<Service>> {
        Ok(self.lock().services.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_service(&self, input: &ServiceInput) -> SalonResult<Service> {
        let mut data = self.lock();
        let service = Service {
            id: data.next_id(),
            name: input.name.clone(),
            category: input.category,
            price: input.price,
            duration_minutes: input.duration_minutes,
            description: input.description.clone(),
            active: input.active,
            created_at: Utc::now(),
        };
        data.services.push(service.clone());
        Ok(service)
    }

    async fn update_service(&self, id: i32, input: &ServiceInput) -> SalonResult<Option<Service>> {
        let mut data = self.lock();
        Ok(data.services.iter_mut().find(|s| s.id == id).map(|service| {
            service.name = input.name.clone();
            service.category = input.category;
            service.price = input.price;
            service.duration_minutes = input.duration_minutes;
            service.description = input.description.clone();
            service.active = input.active;
            service.clone()
        }))
    }

    async fn delete_service(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().services, id, |s| s.id))
    }

    // Supplier operations
    async fn list_suppliers(&self) -> SalonResult<Vec<Supplier>> {
        let mut suppliers = self.lock().suppliers.clone();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: i32) -> SalonResult<Option<Supplier>> {
        Ok(self.lock().suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_supplier(&self, input: &SupplierInput) -> SalonResult<Supplier> {
        let mut data = self.lock();
        let supplier = Supplier {
            id: data.next_id(),
            name: input.name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };
        data.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(&self, id: i32, input: &SupplierInput) -> SalonResult<Option<Supplier>> {
        let mut data = self.lock();
        Ok(data.suppliers.iter_mut().find(|s| s.id == id).map(|supplier| {
            supplier.name = input.name.clone();
            supplier.phone = input.phone.clone();
            supplier.email = input.email.clone();
            supplier.notes = input.notes.clone();
            supplier.clone()
        }))
    }

    async fn delete_supplier(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().suppliers, id, |s| s.id))
    }

    // Product operations
    async fn list_products(&self) -> SalonResult<Vec<Product>> {
        let mut products = self.lock().products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product(&self, id: i32) -> SalonResult<Option<Product>> {
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, input: &ProductInput) -> SalonResult<Product> {
        let mut data = self.lock();
        let product = Product {
            id: data.next_id(),
            name: input.name.clone(),
            stock_quantity: input.stock_quantity,
            buy_price: input.buy_price,
            supplier_id: input.supplier_id,
            created_at: Utc::now(),
        };
        data.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i32, input: &ProductInput) -> SalonResult<Option<Product>> {
        let mut data = self.lock();
        Ok(data.products.iter_mut().find(|p| p.id == id).map(|product| {
            product.name = input.name.clone();
            product.stock_quantity = input.stock_quantity;
            product.buy_price = input.buy_price;
            product.supplier_id = input.supplier_id;
            product.clone()
        }))
    }

    async fn set_product_stock(&self, id: i32, stock_quantity: i32) -> SalonResult<bool> {
        let mut data = self.lock();
        match data.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.stock_quantity = stock_quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().products, id, |p| p.id))
    }

    // Service recipe operations
    async fn list_recipes(&self) -> SalonResult<Vec<ServiceRecipe>> {
        let mut recipes = self.lock().service_recipes.clone();
        recipes.sort_by_key(|r| (r.service_id, r.id));
        Ok(recipes)
    }

    async fn insert_recipe(&self, recipe: &NewServiceRecipe) -> SalonResult<ServiceRecipe> {
        let mut data = self.lock();
        let recipe = ServiceRecipe {
            id: data.next_id(),
            service_id: recipe.service_id,
            product_id: recipe.product_id,
            quantity: recipe.quantity,
            created_at: Utc::now(),
        };
        data.service_recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().service_recipes, id, |r| r.id))
    }

    // Client operations
    async fn list_clients(&self) -> SalonResult<Vec<Client>> {
        let mut clients = self.lock().clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn get_client(&self, id: i32) -> SalonResult<Option<Client>> {
        Ok(self.lock().clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_client_by_phone(&self, phone: &str) -> SalonResult<Option<Client>> {
        Ok(self.lock().clients.iter().find(|c| c.phone == phone).cloned())
    }

    async fn insert_client(&self, input: &ClientInput) -> SalonResult<Client> {
        let mut data = self.lock();
        let client = Client {
            id: data.next_id(),
            name: input.name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            instagram: input.instagram.clone(),
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };
        data.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: i32, input: &ClientInput) -> SalonResult<Option<Client>> {
        let mut data = self.lock();
        Ok(data.clients.iter_mut().find(|c| c.id == id).map(|client| {
            client.name = input.name.clone();
            client.phone = input.phone.clone();
            client.email = input.email.clone();
            client.instagram = input.instagram.clone();
            client.notes = input.notes.clone();
            client.clone()
        }))
    }

    async fn delete_client(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().clients, id, |c| c.id))
    }

    // Appointment operations
    async fn list_appointments(&self) -> SalonResult<Vec<Appointment>> {
        let mut appointments = self.lock().appointments.clone();
        appointments.sort_by(|a, b| {
            (b.date, &b.time, b.id).cmp(&(a.date, &a.time, a.id))
        });
        Ok(appointments)
    }

    async fn list_appointments_on(&self, date: NaiveDate) -> SalonResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .lock()
            .appointments
            .iter()
            .filter(|a| a.date == date)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| (&a.time, a.id).cmp(&(&b.time, b.id)));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: i32) -> SalonResult<Option<Appointment>> {
        Ok(self.lock().appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> SalonResult<Appointment> {
        let mut data = self.lock();
        let appointment = Appointment {
            id: data.next_id(),
            client_id: appointment.client_id,
            service_ids: appointment.service_ids.clone(),
            date: appointment.date,
            time: appointment.time.clone(),
            status: appointment.status,
            notes: appointment.notes.clone(),
            message: appointment.message.clone(),
            created_at: Utc::now(),
        };
        data.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn patch_appointment(
        &self,
        id: i32,
        patch: &AppointmentPatch,
    ) -> SalonResult<Option<Appointment>> {
        let mut data = self.lock();
        Ok(data.appointments.iter_mut().find(|a| a.id == id).map(|appointment| {
            if let Some(date) = patch.date {
                appointment.date = date;
            }
            if let Some(time) = &patch.time {
                appointment.time = time.clone();
            }
            if let Some(service_ids) = &patch.service_ids {
                appointment.service_ids = service_ids.clone();
            }
            if let Some(status) = patch.status {
                appointment.status = status;
            }
            if let Some(notes) = &patch.notes {
                appointment.notes = Some(notes.clone());
            }
            appointment.clone()
        }))
    }

    async fn delete_appointment(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().appointments, id, |a| a.id))
    }

    // Consultation operations
    async fn list_consultations(&self) -> SalonResult<Vec<Consultation>> {
        let mut consultations = self.lock().consultations.clone();
        consultations.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
        Ok(consultations)
    }

    async fn get_consultation(&self, id: i32) -> SalonResult<Option<Consultation>> {
        Ok(self.lock().consultations.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_consultation(&self, consultation: &NewConsultation) -> SalonResult<Consultation> {
        let mut data = self.lock();
        let consultation = Consultation {
            id: data.next_id(),
            appointment_id: consultation.appointment_id,
            client_id: consultation.client_id,
            products: consultation.products.clone(),
            amount: consultation.amount,
            payment_method: consultation.payment_method,
            date: consultation.date,
            notes: consultation.notes.clone(),
            created_at: Utc::now(),
        };
        data.consultations.push(consultation.clone());
        Ok(consultation)
    }

    async fn delete_consultation(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().consultations, id, |c| c.id))
    }

    // Business expense operations
    async fn list_expenses(&self) -> SalonResult<Vec<BusinessExpense>> {
        let mut expenses = self.lock().business_expenses.clone();
        expenses.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
        Ok(expenses)
    }

    async fn get_expense(&self, id: i32) -> SalonResult<Option<BusinessExpense>> {
        Ok(self.lock().business_expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_expense(&self, input: &ExpenseInput) -> SalonResult<BusinessExpense> {
        let mut data = self.lock();
        let expense = BusinessExpense {
            id: data.next_id(),
            description: input.description.clone(),
            amount: input.amount,
            category: input.category,
            date: input.date,
            supplier_id: input.supplier_id,
            product_id: input.product_id,
            created_at: Utc::now(),
        };
        data.business_expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update_expense(
        &self,
        id: i32,
        input: &ExpenseInput,
    ) -> SalonResult<Option<BusinessExpense>> {
        let mut data = self.lock();
        Ok(data.business_expenses.iter_mut().find(|e| e.id == id).map(|expense| {
            expense.description = input.description.clone();
            expense.amount = input.amount;
            expense.category = input.category;
            expense.date = input.date;
            expense.supplier_id = input.supplier_id;
            expense.product_id = input.product_id;
            expense.clone()
        }))
    }

    async fn delete_expense(&self, id: i32) -> SalonResult<bool> {
        Ok(remove_by_id(&mut self.lock().business_expenses, id, |e| e.id))
    }
}

//! Form layouts for each back-office record, and the conversions from filled-in forms
//! back to inputs for the server functions.

use chrono::NaiveDate;

use crate::models::{
    AppointmentStatus, BusinessExpense, Client, ClientInput, ExpenseCategory, ExpenseInput,
    NewAppointment, NewServiceRecipe, Product, ProductInput, Service, ServiceCategory,
    ServiceInput, Supplier, SupplierInput,
};

use super::components::{FormField, FormState};

const NONE: &str = "(none)";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn option_label(name: &str, id: i32) -> String {
    format!("{name} (#{id})")
}

fn id_from_label(value: &str) -> Option<i32> {
    let (_, tail) = value.rsplit_once("(#")?;
    tail.strip_suffix(')')?.parse().ok()
}

fn options<T>(items: &[T], label: impl Fn(&T) -> String, with_none: bool) -> Vec<String> {
    let mut options: Vec<String> = items.iter().map(label).collect();
    if with_none {
        options.insert(0, NONE.to_string());
    }
    options
}

fn parse_date(form: &FormState, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(form.value(label), DATE_FORMAT)
        .map_err(|_| format!("{label}: use YYYY-MM-DD"))
}

fn enum_options<T: ToString>(all: &[T]) -> Vec<String> {
    all.iter().map(|v| v.to_string()).collect()
}

pub fn client_form(client: Option<&Client>) -> FormState {
    let title = if client.is_some() { "Edit client" } else { "New client" };
    let input = client.map(ClientInput::from).unwrap_or_default();

    FormState::new(
        title,
        vec![
            FormField::text("Name", input.name).required(),
            FormField::text("Phone", input.phone).required(),
            FormField::text("Email", input.email.unwrap_or_default()),
            FormField::text("Instagram", input.instagram.unwrap_or_default()),
            FormField::text("Notes", input.notes.unwrap_or_default()),
        ],
    )
}

pub fn client_input(form: &FormState) -> Result<ClientInput, String> {
    Ok(ClientInput {
        name: form.value("Name").to_string(),
        phone: form.value("Phone").to_string(),
        email: form.optional("Email"),
        instagram: form.optional("Instagram"),
        notes: form.optional("Notes"),
    })
}

pub fn supplier_form(supplier: Option<&Supplier>) -> FormState {
    let title = if supplier.is_some() { "Edit supplier" } else { "New supplier" };
    let input = supplier.map(SupplierInput::from).unwrap_or_default();

    FormState::new(
        title,
        vec![
            FormField::text("Name", input.name).required(),
            FormField::text("Phone", input.phone.unwrap_or_default()),
            FormField::text("Email", input.email.unwrap_or_default()),
            FormField::text("Notes", input.notes.unwrap_or_default()),
        ],
    )
}

pub fn supplier_input(form: &FormState) -> Result<SupplierInput, String> {
    Ok(SupplierInput {
        name: form.value("Name").to_string(),
        phone: form.optional("Phone"),
        email: form.optional("Email"),
        notes: form.optional("Notes"),
    })
}

pub fn service_form(service: Option<&Service>) -> FormState {
    let title = if service.is_some() { "Edit service" } else { "New service" };
    let (name, category, price, minutes, description, active) = match service {
        Some(s) => (
            s.name.clone(),
            s.category.to_string(),
            s.price.to_string(),
            s.duration_minutes.to_string(),
            s.description.clone().unwrap_or_default(),
            s.active,
        ),
        None => (String::new(), String::new(), String::new(), "60".to_string(), String::new(), true),
    };

    FormState::new(
        title,
        vec![
            FormField::text("Name", name).required(),
            FormField::choice("Category", enum_options(&ServiceCategory::ALL), &category),
            FormField::text("Price", price).required(),
            FormField::text("Minutes", minutes).required(),
            FormField::text("Description", description),
            FormField::choice(
                "Active",
                vec!["yes".to_string(), "no".to_string()],
                if active { "yes" } else { "no" },
            ),
        ],
    )
}

pub fn service_input(form: &FormState) -> Result<ServiceInput, String> {
    Ok(ServiceInput {
        name: form.value("Name").to_string(),
        category: form.parse("Category")?,
        price: form.parse("Price")?,
        duration_minutes: form.parse("Minutes")?,
        description: form.optional("Description"),
        active: form.value("Active") == "yes",
    })
}

pub fn product_form(product: Option<&Product>, suppliers: &[Supplier]) -> FormState {
    let title = if product.is_some() { "Edit product" } else { "New product" };
    let supplier = product
        .and_then(|p| p.supplier_id)
        .and_then(|id| suppliers.iter().find(|s| s.id == id))
        .map_or_else(|| NONE.to_string(), |s| option_label(&s.name, s.id));

    FormState::new(
        title,
        vec![
            FormField::text("Name", product.map(|p| p.name.clone()).unwrap_or_default()).required(),
            FormField::text(
                "Stock",
                product.map_or_else(|| "0".to_string(), |p| p.stock_quantity.to_string()),
            )
            .required(),
            FormField::text(
                "Buy price",
                product.map(|p| p.buy_price.to_string()).unwrap_or_default(),
            )
            .required(),
            FormField::choice(
                "Supplier",
                options(suppliers, |s| option_label(&s.name, s.id), true),
                &supplier,
            ),
        ],
    )
}

pub fn product_input(form: &FormState) -> Result<ProductInput, String> {
    Ok(ProductInput {
        name: form.value("Name").to_string(),
        stock_quantity: form.parse("Stock")?,
        buy_price: form.parse("Buy price")?,
        supplier_id: id_from_label(form.value("Supplier")),
    })
}

pub fn expense_form(expense: Option<&BusinessExpense>, today: NaiveDate) -> FormState {
    let title = if expense.is_some() { "Edit expense" } else { "New expense" };
    let date = expense.map_or(today, |e| e.date);
    let category = expense.map_or(ExpenseCategory::Other, |e| e.category);

    FormState::new(
        title,
        vec![
            FormField::text(
                "Description",
                expense.map(|e| e.description.clone()).unwrap_or_default(),
            )
            .required(),
            FormField::text("Amount", expense.map(|e| e.amount.to_string()).unwrap_or_default())
                .required(),
            FormField::choice(
                "Category",
                enum_options(&ExpenseCategory::ALL),
                category.as_str(),
            ),
            FormField::text("Date", date.format(DATE_FORMAT).to_string()).required(),
        ],
    )
}

/// Supplier and product links of an existing expense are carried over unchanged.
pub fn expense_input(form: &FormState, existing: Option<&BusinessExpense>) -> Result<ExpenseInput, String> {
    Ok(ExpenseInput {
        description: form.value("Description").to_string(),
        amount: form.parse("Amount")?,
        category: form.parse("Category")?,
        date: parse_date(form, "Date")?,
        supplier_id: existing.and_then(|e| e.supplier_id),
        product_id: existing.and_then(|e| e.product_id),
    })
}

pub fn recipe_form(services: &[Service], products: &[Product]) -> FormState {
    FormState::new(
        "New recipe line",
        vec![
            FormField::choice(
                "Service",
                options(services, |s| option_label(&s.name, s.id), false),
                "",
            ),
            FormField::choice(
                "Product",
                options(products, |p| option_label(&p.name, p.id), false),
                "",
            ),
            FormField::text("Quantity", "1").required(),
        ],
    )
}

pub fn recipe_input(form: &FormState) -> Result<NewServiceRecipe, String> {
    Ok(NewServiceRecipe {
        service_id: id_from_label(form.value("Service")).ok_or("Pick a service")?,
        product_id: id_from_label(form.value("Product")).ok_or("Pick a product")?,
        quantity: form.parse("Quantity")?,
    })
}

pub fn appointment_form(clients: &[Client], services: &[Service], today: NaiveDate) -> FormState {
    let service_options = options(services, |s| option_label(&s.name, s.id), false);
    let mut extra_options = service_options.clone();
    extra_options.insert(0, NONE.to_string());

    FormState::new(
        "New appointment",
        vec![
            FormField::choice(
                "Client",
                options(clients, |c| option_label(&format!("{} {}", c.name, c.phone), c.id), false),
                "",
            ),
            FormField::choice("Service", service_options, ""),
            FormField::choice("Second service", extra_options, NONE),
            FormField::text("Date", today.format(DATE_FORMAT).to_string()).required(),
            FormField::text("Time", "10:00").required(),
            FormField::choice(
                "Status",
                enum_options(&AppointmentStatus::ALL),
                AppointmentStatus::Confirmed.as_str(),
            ),
            FormField::text("Notes", ""),
        ],
    )
}

pub fn appointment_input(form: &FormState) -> Result<NewAppointment, String> {
    let client_id = id_from_label(form.value("Client")).ok_or("Pick a client")?;
    let mut service_ids = vec![id_from_label(form.value("Service")).ok_or("Pick a service")?];
    if let Some(id) = id_from_label(form.value("Second service")) {
        service_ids.push(id);
    }

    Ok(NewAppointment {
        client_id,
        service_ids,
        date: parse_date(form, "Date")?,
        time: form.value("Time").to_string(),
        status: form.parse("Status")?,
        notes: form.optional("Notes"),
        message: None,
    })
}

pub fn password_form() -> FormState {
    FormState::new(
        "Change password",
        vec![
            FormField::text("Current password", "").required(),
            FormField::text("New password", "").required(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn supplier(id: i32, name: &str) -> Supplier {
        Supplier {
            id,
            name: name.to_string(),
            phone: None,
            email: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_label_round_trip() {
        assert_eq!(id_from_label(&option_label("Keratin (long hair)", 12)), Some(12));
        assert_eq!(id_from_label(NONE), None);
    }

    #[test]
    fn test_product_form_preselects_supplier() {
        let suppliers = vec![supplier(1, "Alpha"), supplier(2, "Beta")];
        let product = Product {
            id: 5,
            name: "Mask".to_string(),
            stock_quantity: -1,
            buy_price: 4.5,
            supplier_id: Some(2),
            created_at: Utc::now(),
        };

        let form = product_form(Some(&product), &suppliers);
        let input = product_input(&form).unwrap();
        assert_eq!(input.supplier_id, Some(2));
        assert_eq!(input.stock_quantity, -1);
        assert_eq!(input.buy_price, 4.5);
    }

    #[test]
    fn test_service_form_parses_category_and_flag() {
        let mut form = service_form(None);
        form.fields[0].value = "Brow lift".to_string();
        form.fields[2].value = "25".to_string();

        let input = service_input(&form).unwrap();
        assert_eq!(input.category, ServiceCategory::Hair);
        assert_eq!(input.duration_minutes, 60);
        assert!(input.active);

        form.fields[2].value = "free".to_string();
        assert!(service_input(&form).is_err());
    }

    #[test]
    fn test_expense_date_format() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let mut form = expense_form(None, today);
        form.fields[0].value = "Towels".to_string();
        form.fields[1].value = "30".to_string();

        assert_eq!(expense_input(&form, None).unwrap().date, today);

        form.fields[3].value = "01/08/2024".to_string();
        assert_eq!(expense_input(&form, None).unwrap_err(), "Date: use YYYY-MM-DD");
    }
}

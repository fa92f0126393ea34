//! The admin console: login, dashboard and every back-office screen, driven by one loop.

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::config::Config;
use crate::db::{Database, Store};
use crate::error::SalonError;
use crate::functions::{
    admins, appointments, clients, consultations, dashboard, expenses, products,
    service_recipes, services, suppliers,
};
use crate::mailer;
use crate::models::BusinessExpense;
use crate::receipt_gen::{Receipt, ReceiptGenerator};

use super::appointments::{self as appointments_ui, AppointmentAction, AppointmentsState};
use super::components::{FormEvent, FormState, render_form};
use super::consultation_wizard::{self as wizard_ui, ConsultationWizardState, WizardAction};
use super::dashboard::{self as dashboard_ui, DashboardAction, DashboardState, MenuEntry};
use super::forms;
use super::login::{self as login_ui, LoginAction, LoginState};
use super::receipts::{self as receipts_ui, ReceiptAction, ReceiptsState};
use super::records::{self as records_ui, RecordAction, RecordKind, RecordsState, Row};
use super::{Popup, render_help, render_popup, restore_terminal, setup_terminal};

#[derive(Clone, Copy, PartialEq, Debug)]
enum FormTarget {
    Client(Option<i32>),
    Product(Option<i32>),
    Service(Option<i32>),
    Supplier(Option<i32>),
    Expense(Option<i32>),
    Recipe,
    Appointment,
    Password,
}

impl FormTarget {
    /// The screen to go back to once the form is saved or cancelled.
    fn origin(&self) -> Screen {
        match self {
            FormTarget::Client(_) => Screen::Records(RecordKind::Clients),
            FormTarget::Product(_) => Screen::Records(RecordKind::Products),
            FormTarget::Service(_) => Screen::Records(RecordKind::Services),
            FormTarget::Supplier(_) => Screen::Records(RecordKind::Suppliers),
            FormTarget::Expense(_) => Screen::Records(RecordKind::Expenses),
            FormTarget::Recipe => Screen::Records(RecordKind::Recipes),
            FormTarget::Appointment => Screen::Appointments,
            FormTarget::Password => Screen::Dashboard,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Screen {
    Login,
    Dashboard,
    Appointments,
    Records(RecordKind),
    Form(FormTarget),
    Completion,
    Receipts,
}

struct App {
    db: Database,
    config: Config,
    screen: Screen,
    username: Option<String>,
    login_state: LoginState,
    dashboard_state: Option<DashboardState>,
    appointments_state: Option<AppointmentsState>,
    records_state: Option<RecordsState>,
    form_state: Option<FormState>,
    wizard_state: Option<ConsultationWizardState>,
    receipts_state: Option<ReceiptsState>,
    /// The expense being edited, so its supplier and product links survive the form.
    editing_expense: Option<BusinessExpense>,
    popup: Option<Popup>,
    quit: bool,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl App {
    fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config,
            screen: Screen::Login,
            username: None,
            login_state: LoginState::new(),
            dashboard_state: None,
            appointments_state: None,
            records_state: None,
            form_state: None,
            wizard_state: None,
            receipts_state: None,
            editing_expense: None,
            popup: None,
            quit: false,
        }
    }

    fn store(&self) -> &dyn Store {
        self.db.as_ref()
    }

    fn show_error(&mut self, err: impl std::fmt::Display) {
        self.popup = Some(Popup::error(err));
    }

    // Screen loaders

    async fn open_dashboard(&mut self) -> Result<()> {
        let stats = dashboard::dashboard_stats(self.store(), today(), self.config.low_stock_threshold).await?;
        let username = self.username.clone().unwrap_or_default();
        match &mut self.dashboard_state {
            Some(state) => state.stats = Some(stats),
            None => self.dashboard_state = Some(DashboardState::new(username, stats)),
        }
        self.screen = Screen::Dashboard;
        Ok(())
    }

    async fn open_appointments(&mut self, day: Option<NaiveDate>) -> Result<()> {
        let list = match day {
            Some(day) => appointments::list_appointments_by_date(self.store(), day).await?,
            None => appointments::list_appointments(self.store()).await?,
        };
        match &mut self.appointments_state {
            Some(state) => {
                state.day = day;
                state.set_appointments(list);
            }
            None => self.appointments_state = Some(AppointmentsState::new(list, day)),
        }
        self.screen = Screen::Appointments;
        Ok(())
    }

    async fn record_rows(&self, kind: RecordKind) -> Result<Vec<Row>> {
        let store = self.store();
        let (query, low_stock_only) = match &self.records_state {
            Some(state) if state.kind == kind => (state.query.clone(), state.low_stock_only),
            _ => (String::new(), false),
        };
        let threshold = self.config.low_stock_threshold;

        let rows = match kind {
            RecordKind::Clients => records_ui::client_rows(&clients::search_clients(store, &query).await?),
            RecordKind::Products => {
                let mut list = products::list_products(store).await?;
                if low_stock_only {
                    list.retain(|p| p.product.stock_quantity <= threshold);
                }
                records_ui::product_rows(&list, threshold)
            }
            RecordKind::Services => records_ui::service_rows(&services::list_services(store).await?),
            RecordKind::Recipes => {
                let recipes = service_recipes::list_recipes(store).await?;
                let all_services = services::list_services(store).await?;
                let all_products = store.list_products().await?;
                records_ui::recipe_rows(&recipes, &all_services, &all_products)
            }
            RecordKind::Suppliers => records_ui::supplier_rows(&suppliers::list_suppliers(store).await?),
            RecordKind::Expenses => records_ui::expense_rows(&expenses::list_expenses(store, None).await?),
        };
        Ok(rows)
    }

    async fn open_records(&mut self, kind: RecordKind) -> Result<()> {
        let rows = self.record_rows(kind).await?;
        match &mut self.records_state {
            Some(state) if state.kind == kind => state.set_rows(rows),
            _ => self.records_state = Some(RecordsState::new(kind, rows)),
        }
        self.screen = Screen::Records(kind);
        Ok(())
    }

    async fn open_receipts(&mut self) -> Result<()> {
        let list = consultations::list_consultations(self.store()).await?;
        match &mut self.receipts_state {
            Some(state) => state.set_consultations(list),
            None => self.receipts_state = Some(ReceiptsState::new(list)),
        }
        self.screen = Screen::Receipts;
        Ok(())
    }

    async fn open_screen(&mut self, screen: Screen) -> Result<()> {
        match screen {
            Screen::Dashboard => self.open_dashboard().await,
            Screen::Appointments => {
                let day = self.appointments_state.as_ref().and_then(|s| s.day);
                self.open_appointments(day).await
            }
            Screen::Records(kind) => self.open_records(kind).await,
            Screen::Receipts => self.open_receipts().await,
            other => {
                self.screen = other;
                Ok(())
            }
        }
    }

    async fn open_form(&mut self, target: FormTarget) -> Result<()> {
        let store = self.store();
        let form = match target {
            FormTarget::Client(id) => {
                let client = match id {
                    Some(id) => Some(clients::get_client(store, id).await?),
                    None => None,
                };
                forms::client_form(client.as_ref())
            }
            FormTarget::Supplier(id) => {
                let supplier = match id {
                    Some(id) => Some(suppliers::get_supplier(store, id).await?),
                    None => None,
                };
                forms::supplier_form(supplier.as_ref())
            }
            FormTarget::Service(id) => {
                let service = match id {
                    Some(id) => Some(services::get_service(store, id).await?),
                    None => None,
                };
                forms::service_form(service.as_ref())
            }
            FormTarget::Product(id) => {
                let product = match id {
                    Some(id) => Some(products::get_product(store, id).await?),
                    None => None,
                };
                let all_suppliers = suppliers::list_suppliers(store).await?;
                forms::product_form(product.as_ref(), &all_suppliers)
            }
            FormTarget::Expense(id) => {
                let expense = match id {
                    Some(id) => Some(expenses::get_expense(store, id).await?),
                    None => None,
                };
                let form = forms::expense_form(expense.as_ref(), today());
                self.editing_expense = expense;
                form
            }
            FormTarget::Recipe => {
                let all_services = services::list_services(store).await?;
                let all_products = store.list_products().await?;
                if all_services.is_empty() || all_products.is_empty() {
                    return Err(anyhow!("Add a service and a product first"));
                }
                forms::recipe_form(&all_services, &all_products)
            }
            FormTarget::Appointment => {
                let all_clients = clients::list_clients(store).await?;
                let active = services::list_active_services(store).await?;
                if all_clients.is_empty() || active.is_empty() {
                    return Err(anyhow!("Add a client and an active service first"));
                }
                forms::appointment_form(&all_clients, &active, today())
            }
            FormTarget::Password => forms::password_form(),
        };

        self.form_state = Some(form);
        self.screen = Screen::Form(target);
        Ok(())
    }

    async fn open_completion(&mut self, appointment_id: i32) -> Result<()> {
        let store = self.store();
        let details = appointments::get_appointment(store, appointment_id).await?;
        let catalog = store.list_products().await?;
        let suggested =
            service_recipes::suggested_products(store, &details.appointment.service_ids).await?;

        self.wizard_state = Some(ConsultationWizardState::new(details, catalog, &suggested, today()));
        self.screen = Screen::Completion;
        Ok(())
    }

    // Action handlers

    async fn login(&mut self, username: String, password: String) -> Result<()> {
        if admins::login(self.store(), &username, &password).await? {
            self.username = Some(username);
            self.login_state = LoginState::new();
            self.dashboard_state = None;
            self.open_dashboard().await
        } else {
            self.login_state.rejected("Invalid username or password");
            Ok(())
        }
    }

    fn logout(&mut self) {
        self.username = None;
        self.login_state = LoginState::new();
        self.dashboard_state = None;
        self.appointments_state = None;
        self.records_state = None;
        self.receipts_state = None;
        self.screen = Screen::Login;
    }

    async fn dashboard_action(&mut self, action: DashboardAction) -> Result<()> {
        match action {
            DashboardAction::Quit => self.quit = true,
            DashboardAction::Refresh => self.open_dashboard().await?,
            DashboardAction::Open(entry) => match entry {
                MenuEntry::Appointments => self.open_appointments(Some(today())).await?,
                MenuEntry::Clients => self.open_records(RecordKind::Clients).await?,
                MenuEntry::Products => self.open_records(RecordKind::Products).await?,
                MenuEntry::Services => self.open_records(RecordKind::Services).await?,
                MenuEntry::Recipes => self.open_records(RecordKind::Recipes).await?,
                MenuEntry::Suppliers => self.open_records(RecordKind::Suppliers).await?,
                MenuEntry::Expenses => self.open_records(RecordKind::Expenses).await?,
                MenuEntry::Receipts => self.open_receipts().await?,
                MenuEntry::ChangePassword => self.open_form(FormTarget::Password).await?,
                MenuEntry::Logout => self.logout(),
            },
        }
        Ok(())
    }

    async fn appointment_action(&mut self, action: AppointmentAction) -> Result<()> {
        let store = self.store();
        match action {
            AppointmentAction::Back => self.open_dashboard().await?,
            AppointmentAction::New => self.open_form(FormTarget::Appointment).await?,
            AppointmentAction::SetStatus(id, status) => {
                appointments::set_appointment_status(store, id, status).await?;
                self.open_screen(Screen::Appointments).await?;
            }
            AppointmentAction::Complete(id) => self.open_completion(id).await?,
            AppointmentAction::Delete(id) => {
                appointments::delete_appointment(store, id).await?;
                self.open_screen(Screen::Appointments).await?;
            }
            AppointmentAction::ShowDay(day) => self.open_appointments(day).await?,
        }
        Ok(())
    }

    async fn client_history(&mut self, client_id: i32) -> Result<()> {
        let store = self.store();
        let client = clients::get_client(store, client_id).await?;
        let history = clients::client_history(store, client_id).await?;

        let message = if history.is_empty() {
            "No appointments yet".to_string()
        } else {
            history
                .iter()
                .map(|a| format!("{} {} ({})", a.date.format("%d/%m/%Y"), a.time, a.status))
                .collect::<Vec<_>>()
                .join("; ")
        };
        self.popup = Some(Popup::info(format!("History of {}", client.name), message));
        Ok(())
    }

    async fn record_action(&mut self, kind: RecordKind, action: RecordAction) -> Result<()> {
        let store = self.store();
        match action {
            RecordAction::Back => self.open_dashboard().await?,
            RecordAction::New => self.open_form(new_target(kind)).await?,
            RecordAction::Edit(id) => {
                if let Some(target) = edit_target(kind, id) {
                    self.open_form(target).await?;
                }
            }
            RecordAction::Delete(id) => {
                match kind {
                    RecordKind::Clients => clients::delete_client(store, id).await?,
                    RecordKind::Products => products::delete_product(store, id).await?,
                    RecordKind::Services => services::delete_service(store, id).await?,
                    RecordKind::Recipes => service_recipes::delete_recipe(store, id).await?,
                    RecordKind::Suppliers => suppliers::delete_supplier(store, id).await?,
                    RecordKind::Expenses => expenses::delete_expense(store, id).await?,
                }
                self.open_records(kind).await?;
            }
            RecordAction::Open(id) => self.client_history(id).await?,
            RecordAction::ToggleActive(id) => {
                let service = services::get_service(store, id).await?;
                services::set_service_active(store, id, !service.active).await?;
                self.open_records(kind).await?;
            }
            RecordAction::ToggleLowStock | RecordAction::Search(_) => self.open_records(kind).await?,
        }
        Ok(())
    }

    /// Saves the form. Input mistakes stay on the form; everything else goes to the popup.
    async fn submit_form(&mut self, target: FormTarget) -> Result<()> {
        let Some(form) = self.form_state.as_ref() else {
            return Ok(());
        };
        let store = self.db.as_ref();

        let saved: Result<(), String> = match target {
            FormTarget::Client(id) => match forms::client_input(form) {
                Ok(input) => {
                    save(match id {
                        Some(id) => clients::update_client(store, id, input).await.map(drop),
                        None => clients::create_client(store, input).await.map(drop),
                    })?
                }
                Err(e) => Err(e),
            },
            FormTarget::Supplier(id) => match forms::supplier_input(form) {
                Ok(input) => {
                    save(match id {
                        Some(id) => suppliers::update_supplier(store, id, input).await.map(drop),
                        None => suppliers::create_supplier(store, input).await.map(drop),
                    })?
                }
                Err(e) => Err(e),
            },
            FormTarget::Service(id) => match forms::service_input(form) {
                Ok(input) => {
                    save(match id {
                        Some(id) => services::update_service(store, id, input).await.map(drop),
                        None => services::create_service(store, input).await.map(drop),
                    })?
                }
                Err(e) => Err(e),
            },
            FormTarget::Product(id) => match forms::product_input(form) {
                Ok(input) => {
                    save(match id {
                        Some(id) => products::update_product(store, id, input, today()).await.map(drop),
                        None => products::create_product(store, input).await.map(drop),
                    })?
                }
                Err(e) => Err(e),
            },
            FormTarget::Expense(id) => match forms::expense_input(form, self.editing_expense.as_ref()) {
                Ok(input) => {
                    save(match id {
                        Some(id) => expenses::update_expense(store, id, input).await.map(drop),
                        None => expenses::create_expense(store, input).await.map(drop),
                    })?
                }
                Err(e) => Err(e),
            },
            FormTarget::Recipe => match forms::recipe_input(form) {
                Ok(input) => save(service_recipes::add_recipe(store, input).await.map(drop))?,
                Err(e) => Err(e),
            },
            FormTarget::Appointment => match forms::appointment_input(form) {
                Ok(input) => save(appointments::create_admin_appointment(store, input).await.map(drop))?,
                Err(e) => Err(e),
            },
            FormTarget::Password => {
                let username = self.username.clone().unwrap_or_default();
                let result = admins::change_password(
                    store,
                    &username,
                    form.value("Current password"),
                    form.value("New password"),
                )
                .await;
                match result {
                    Err(SalonError::InvalidCredentials) => Err("Current password is wrong".to_string()),
                    other => {
                        let saved = save(other.map(drop))?;
                        if saved.is_ok() {
                            self.popup = Some(Popup::info("Password", "Password changed"));
                        }
                        saved
                    }
                }
            }
        };

        match saved {
            Ok(()) => {
                self.form_state = None;
                self.editing_expense = None;
                self.open_screen(target.origin()).await
            }
            Err(message) => {
                if let Some(form) = &mut self.form_state {
                    form.error = Some(message);
                }
                Ok(())
            }
        }
    }

    async fn form_event(&mut self, target: FormTarget, event: FormEvent) -> Result<()> {
        match event {
            FormEvent::Submit => self.submit_form(target).await,
            FormEvent::Cancel => {
                self.form_state = None;
                self.editing_expense = None;
                self.open_screen(target.origin()).await
            }
        }
    }

    async fn wizard_action(&mut self, action: WizardAction) -> Result<()> {
        match action {
            WizardAction::Cancel => {
                self.wizard_state = None;
                self.open_screen(Screen::Appointments).await
            }
            WizardAction::Submit(input) => {
                let outcome = consultations::complete_appointment(self.store(), input, today()).await?;
                self.wizard_state = None;
                self.open_screen(Screen::Appointments).await?;

                let mut message = format!(
                    "Receipt #{} saved for {:.2}.",
                    outcome.consultation.id, outcome.consultation.amount
                );
                if let Some(next) = &outcome.next_appointment {
                    message.push_str(&format!(
                        " Next visit booked for {} at {}.",
                        next.date.format("%d/%m/%Y"),
                        next.time
                    ));
                }
                self.popup = Some(Popup::info("Appointment completed", message));
                Ok(())
            }
        }
    }

    async fn receipt_action(&mut self, action: ReceiptAction) -> Result<()> {
        match action {
            ReceiptAction::Back => self.open_dashboard().await?,
            ReceiptAction::Generate(id) => {
                let receipt = Receipt::load(self.store(), id).await?;
                let generator = ReceiptGenerator::new(&self.config.receipts_dir, &self.config.business_name)?;
                let (md_path, pdf_path) = generator.generate(&receipt)?;
                self.popup = Some(Popup::info(
                    "Receipt written",
                    format!("{} and {}", md_path.display(), pdf_path.display()),
                ));
            }
            ReceiptAction::Email(id) => {
                let to = mailer::email_receipt(self.store(), &self.config, id).await?;
                self.popup = Some(Popup::info("Receipt sent", format!("Mailed to {to}")));
            }
            ReceiptAction::Delete(id) => {
                consultations::delete_consultation(self.store(), id).await?;
                self.open_receipts().await?;
            }
        }
        Ok(())
    }

    /// Reads one key press and applies it to the current screen.
    async fn handle_event(&mut self) -> Result<()> {
        if self.popup.is_some() {
            if let Event::Key(_) = event::read()? {
                self.popup = None;
            }
            return Ok(());
        }

        let result = match self.screen {
            Screen::Login => match login_ui::handle_input(&mut self.login_state)? {
                Some(LoginAction::Submit { username, password }) => self.login(username, password).await,
                Some(LoginAction::Quit) => {
                    self.quit = true;
                    Ok(())
                }
                None => Ok(()),
            },
            Screen::Dashboard => match self.dashboard_state.as_mut() {
                Some(state) => match dashboard_ui::handle_input(state)? {
                    Some(action) => self.dashboard_action(action).await,
                    None => Ok(()),
                },
                None => self.open_dashboard().await,
            },
            Screen::Appointments => match self.appointments_state.as_mut() {
                Some(state) => match appointments_ui::handle_input(state, today())? {
                    Some(action) => self.appointment_action(action).await,
                    None => Ok(()),
                },
                None => self.open_appointments(Some(today())).await,
            },
            Screen::Records(kind) => match self.records_state.as_mut() {
                Some(state) => match records_ui::handle_input(state)? {
                    Some(action) => self.record_action(kind, action).await,
                    None => Ok(()),
                },
                None => self.open_records(kind).await,
            },
            Screen::Form(target) => match self.form_state.as_mut() {
                Some(form) => match read_form_event(form)? {
                    Some(event) => self.form_event(target, event).await,
                    None => Ok(()),
                },
                None => self.open_screen(target.origin()).await,
            },
            Screen::Completion => match self.wizard_state.as_mut() {
                Some(state) => match wizard_ui::handle_input(state)? {
                    Some(action) => self.wizard_action(action).await,
                    None => Ok(()),
                },
                None => self.open_screen(Screen::Appointments).await,
            },
            Screen::Receipts => match self.receipts_state.as_mut() {
                Some(state) => match receipts_ui::handle_input(state)? {
                    Some(action) => self.receipt_action(action).await,
                    None => Ok(()),
                },
                None => self.open_receipts().await,
            },
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "Admin action failed");
            self.show_error(err);
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, f: &mut Frame<B>) {
        match self.screen {
            Screen::Login => login_ui::render_login(f, &self.login_state),
            Screen::Dashboard => {
                if let Some(state) = &mut self.dashboard_state {
                    dashboard_ui::render_dashboard(f, state);
                }
            }
            Screen::Appointments => {
                if let Some(state) = &mut self.appointments_state {
                    appointments_ui::render_appointments(f, state);
                }
            }
            Screen::Records(_) => {
                if let Some(state) = &mut self.records_state {
                    records_ui::render_records(f, state);
                }
            }
            Screen::Form(_) => {
                if let Some(form) = &self.form_state {
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .margin(1)
                        .constraints([Constraint::Min(5), Constraint::Length(3)].as_ref())
                        .split(f.size());
                    render_form(f, chunks[0], form);
                    render_help(
                        f,
                        chunks[1],
                        "Enter - Edit/Cycle | Up/Down - Navigate | S - Save | Esc - Cancel",
                    );
                }
            }
            Screen::Completion => {
                if let Some(state) = &mut self.wizard_state {
                    wizard_ui::render_consultation_wizard(f, state);
                }
            }
            Screen::Receipts => {
                if let Some(state) = &mut self.receipts_state {
                    receipts_ui::render_receipts(f, state);
                }
            }
        }

        if let Some(popup) = &self.popup {
            render_popup(f, popup);
        }
    }
}

/// Server-side failures become popups; validation messages stay on the form.
fn save(result: Result<(), SalonError>) -> Result<Result<(), String>> {
    match result {
        Ok(()) => Ok(Ok(())),
        Err(SalonError::Validation(message)) => Ok(Err(message)),
        Err(err) => Err(err.into()),
    }
}

fn new_target(kind: RecordKind) -> FormTarget {
    match kind {
        RecordKind::Clients => FormTarget::Client(None),
        RecordKind::Products => FormTarget::Product(None),
        RecordKind::Services => FormTarget::Service(None),
        RecordKind::Recipes => FormTarget::Recipe,
        RecordKind::Suppliers => FormTarget::Supplier(None),
        RecordKind::Expenses => FormTarget::Expense(None),
    }
}

fn edit_target(kind: RecordKind, id: i32) -> Option<FormTarget> {
    match kind {
        RecordKind::Clients => Some(FormTarget::Client(Some(id))),
        RecordKind::Products => Some(FormTarget::Product(Some(id))),
        RecordKind::Services => Some(FormTarget::Service(Some(id))),
        RecordKind::Suppliers => Some(FormTarget::Supplier(Some(id))),
        RecordKind::Expenses => Some(FormTarget::Expense(Some(id))),
        RecordKind::Recipes => None,
    }
}

fn read_form_event(form: &mut FormState) -> Result<Option<FormEvent>> {
    if let Event::Key(key) = event::read()? {
        return Ok(form.handle_key(key.code));
    }
    Ok(None)
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.quit {
        terminal.draw(|f| app.draw(f))?;
        app.handle_event().await?;
    }
    Ok(())
}

/// Run the admin console until the user quits.
pub async fn run_admin(db: Database, config: Config) -> Result<()> {
    let mut app = App::new(db, config);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app).await;
    restore_terminal(&mut terminal)?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forms_return_to_their_list() {
        assert_eq!(
            FormTarget::Expense(Some(3)).origin(),
            Screen::Records(RecordKind::Expenses)
        );
        assert_eq!(FormTarget::Appointment.origin(), Screen::Appointments);
        assert_eq!(FormTarget::Password.origin(), Screen::Dashboard);
    }

    #[test]
    fn test_recipes_have_no_edit_form() {
        assert_eq!(edit_target(RecordKind::Recipes, 1), None);
        assert_eq!(edit_target(RecordKind::Clients, 1), Some(FormTarget::Client(Some(1))));
        assert_eq!(new_target(RecordKind::Recipes), FormTarget::Recipe);
    }

    #[test]
    fn test_validation_errors_stay_on_the_form() {
        let kept = save(Err(SalonError::validation("Name is required"))).unwrap();
        assert_eq!(kept, Err("Name is required".to_string()));

        assert!(save(Err(SalonError::not_found("Client", 4))).is_err());
        assert_eq!(save(Ok(())).unwrap(), Ok(()));
    }
}

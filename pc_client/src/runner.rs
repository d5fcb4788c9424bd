//! Executes parsed commands against a catalog client.

use crate::{commands::Command, output};
use product_catalog::{CatalogClient, ClientError, ClientResult};

/// Run `command` and return the text to print
///
/// `default_page_size` fills in `list` when no page size was given.
pub async fn execute(
    client: &CatalogClient,
    command: Command,
    default_page_size: u32,
) -> ClientResult<String> {
    let auth = client.auth();
    let products = client.products();

    let text = match command {
        Command::Login { username, password } => {
            let user = auth.login(&username, &password).await?;
            format!("Logged in as {}\n", output::format_user(&user))
        }
        Command::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let user = auth
                .register(&username, &email, &password, &confirm_password)
                .await?;
            format!("Registered and logged in as {}\n", output::format_user(&user))
        }
        Command::Logout => {
            auth.logout();
            "Logged out\n".to_string()
        }
        Command::WhoAmI => format!("{}\n", output::format_session(&auth.state())),
        Command::ForgotPassword { email } => {
            auth.forgot_password(&email).await?;
            "If that address has an account, reset instructions are on their way\n".to_string()
        }
        Command::List { page, per_page } => {
            let page = products
                .list(page.unwrap_or(1), per_page.unwrap_or(default_page_size))
                .await?;
            output::format_page(&page)
        }
        Command::Get { id } => output::format_product(&products.get(&id).await?),
        Command::Create(product) => {
            let created = products.create(&product).await?;
            format!("Created product {}\n{}", created.id, output::format_product(&created))
        }
        Command::Update { id, update } => {
            let updated = products.update(&id, &update).await?;
            format!("Updated product {}\n{}", updated.id, output::format_product(&updated))
        }
        Command::Delete { id } => {
            products.delete(&id).await?;
            format!("Deleted product {id}\n")
        }
        Command::Search { query } => output::format_products(&products.search(&query).await?),
    };

    Ok(text)
}

/// Text shown for a failed command, with a hint when logging in would help
pub fn error_text(error: &ClientError) -> String {
    if error.requires_login() {
        format!("{} Run `pc_client login USERNAME PASSWORD` first.", error.client_message())
    } else {
        error.client_message()
    }
}

//! Typed client for the `/products` resource.

use super::{
    dispatcher::{ApiRequest, Dispatcher},
    models::{NewProduct, Product, ProductId, ProductPage, ProductUpdate, SearchResponse},
};
use crate::errors::{ClientError, ClientResult};

const RESOURCE: &str = "products";

/// Product CRUD and search over an authenticated dispatcher
#[derive(Clone)]
pub struct ProductApi {
    dispatcher: Dispatcher,
}

impl ProductApi {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// List one page of products
    ///
    /// # Errors
    ///
    /// * `ClientError::InvalidArgument` - `page` or `per_page` is zero
    pub async fn list(&self, page: u32, per_page: u32) -> ClientResult<ProductPage> {
        if page == 0 || per_page == 0 {
            return Err(ClientError::InvalidArgument(
                "Page and per_page must be positive integers".to_string(),
            ));
        }

        let request = ApiRequest::get([RESOURCE])
            .query("page", page)
            .query("per_page", per_page);
        self.dispatcher.request_json(request).await
    }

    /// Fetch a single product
    pub async fn get(&self, id: &ProductId) -> ClientResult<Product> {
        require_id(id)?;
        self.dispatcher
            .request_json(ApiRequest::get([RESOURCE.to_string(), id.to_string()]))
            .await
    }

    /// Create a product
    ///
    /// # Errors
    ///
    /// * `ClientError::Validation` - Empty title or negative/non-finite price;
    ///   nothing is sent
    pub async fn create(&self, product: &NewProduct) -> ClientResult<Product> {
        validate_title(&product.title)?;
        validate_price(product.price)?;

        let request = ApiRequest::post([RESOURCE]).json(product)?;
        self.dispatcher.request_json(request).await
    }

    /// Update the fields set in `update`
    ///
    /// # Errors
    ///
    /// * `ClientError::InvalidArgument` - Empty id, or no field is set
    /// * `ClientError::Validation` - A blank title or bad price; nothing is sent
    pub async fn update(&self, id: &ProductId, update: &ProductUpdate) -> ClientResult<Product> {
        require_id(id)?;
        if update.is_empty() {
            return Err(ClientError::InvalidArgument(
                "Nothing to update".to_string(),
            ));
        }
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        validate_price(update.price)?;

        let request = ApiRequest::put([RESOURCE.to_string(), id.to_string()]).json(update)?;
        self.dispatcher.request_json(request).await
    }

    /// Delete a product
    pub async fn delete(&self, id: &ProductId) -> ClientResult<()> {
        require_id(id)?;
        self.dispatcher
            .request(ApiRequest::delete([RESOURCE.to_string(), id.to_string()]))
            .await?;
        Ok(())
    }

    /// Search titles and descriptions
    pub async fn search(&self, query: &str) -> ClientResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidArgument(
                "Search query is required".to_string(),
            ));
        }

        let request = ApiRequest::get([RESOURCE, "search"]).query("q", query);
        let response: SearchResponse = self.dispatcher.request_json(request).await?;
        Ok(response.into_products())
    }
}

fn require_id(id: &ProductId) -> ClientResult<()> {
    if id.is_empty() {
        return Err(ClientError::InvalidArgument(
            "Product ID is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_title(title: &str) -> ClientResult<()> {
    if title.trim().is_empty() {
        return Err(ClientError::Validation(
            "Product title is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: Option<f64>) -> ClientResult<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(ClientError::Validation(
            "Price must be a non-negative number".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Widget").is_ok());
        assert!(matches!(validate_title(""), Err(ClientError::Validation(_))));
        assert!(matches!(validate_title("   "), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(None).is_ok());
        assert!(validate_price(Some(0.0)).is_ok());
        assert!(validate_price(Some(-1.0)).is_err());
        assert!(validate_price(Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_require_id() {
        assert!(require_id(&ProductId::Int(1)).is_ok());
        assert!(matches!(
            require_id(&ProductId::from("")),
            Err(ClientError::InvalidArgument(_))
        ));
    }
}

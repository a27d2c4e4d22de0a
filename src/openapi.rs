use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::services::{
    categories::{CategoryResponse, CreateCategoryInput, UpdateCategoryInput},
    products::{
        CategorySummary, CreateProductInput, ProductResponse, SupplierSummary, UpdateProductInput,
    },
    suppliers::{CreateSupplierInput, SupplierResponse, UpdateSupplierInput},
    users::{CreateUserInput, UpdateUserInput, UserPostSummary, UserResponse},
    DeletedResponse, ListMeta, ListResponse, ProductSummary,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = "Inventory and catalog administration backend: users, posts, categories, suppliers and products, with object-stored product images.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Users", description = "User account management"),
        (name = "Categories", description = "Product category management"),
        (name = "Suppliers", description = "Supplier management"),
        (name = "Products", description = "Product and image management"),
    ),
    paths(
        // Users
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,

        // Categories
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        // Suppliers
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        // Products
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
    ),
    components(schemas(
        crate::entities::user::Role,
        crate::errors::ErrorResponse,
        DeletedResponse,
        ListMeta,
        ProductSummary,
        CreateUserInput,
        UpdateUserInput,
        UserResponse,
        UserPostSummary,
        ListResponse<UserResponse>,
        CreateCategoryInput,
        UpdateCategoryInput,
        CategoryResponse,
        ListResponse<CategoryResponse>,
        CreateSupplierInput,
        UpdateSupplierInput,
        SupplierResponse,
        ListResponse<SupplierResponse>,
        CreateProductInput,
        UpdateProductInput,
        ProductResponse,
        CategorySummary,
        SupplierSummary,
        ListResponse<ProductResponse>,
    ))
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the generated document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

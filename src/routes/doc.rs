use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        cart::{AddToCartRequest, CartDto, CartItemDto, CheckoutResponse, RemoveFromCartRequest},
        favorites::{FavoriteProductList, FavoriteSet, ToggleFavoriteRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        stats::{
            CompanyStats, OwnedProductStats, OwnedProductStatsList, ProductFavoriteCount,
            TopProduct, TopProductList,
        },
    },
    entity::{carts::CartStatus, users::Role},
    models::Product,
    response::{ApiResponse, Meta},
    routes::{auth, cart, favorites, health, params, products, stats},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::checkout,
        cart::clear_cart,
        favorites::toggle_favorite,
        favorites::list_favorites,
        stats::product_count,
        stats::top_products,
        stats::my_products,
        stats::by_company,
    ),
    components(
        schemas(
            Role,
            CartStatus,
            Product,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddToCartRequest,
            RemoveFromCartRequest,
            CartItemDto,
            CartDto,
            CheckoutResponse,
            ToggleFavoriteRequest,
            FavoriteSet,
            FavoriteProductList,
            ProductFavoriteCount,
            TopProduct,
            TopProductList,
            OwnedProductStats,
            OwnedProductStatsList,
            CompanyStats,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartDto>,
            ApiResponse<AuthResponse>,
            ApiResponse<TopProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Products", description = "Product catalog"),
        (name = "Cart", description = "Per-client cart with stock reservation"),
        (name = "Favorites", description = "Favorite toggling and listing"),
        (name = "Favorite stats", description = "Aggregate favorite counts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

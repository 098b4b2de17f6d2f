//! In-process stand-in for the store's REST backend.
//!
//! Serves the same routes and JSON shapes as the real API (Spanish field
//! names, `activo` as `1`/`0`, `{"error": ...}` bodies), checks bearer tokens
//! on writes, and records every request so tests can assert on what the
//! client actually sent.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use url::Url;

/// Email of the seeded back-office account.
pub const ADMIN_EMAIL: &str = "admin@tienda.com";
/// Password of the seeded back-office account.
pub const ADMIN_PASSWORD: &str = "admin123";
/// Id of the seeded back-office account.
pub const ADMIN_ID: i64 = 1;
/// Upload present from the start, used by product 1.
pub const SEEDED_IMAGE: &str = "1-camiseta.jpg";
/// Contents of [`SEEDED_IMAGE`].
pub const SEEDED_IMAGE_BYTES: &[u8] = b"not really a jpeg";

const SIGNING_SECRET: &[u8] = b"mock-store-signing-secret";

/// Claims carried by tokens the mock store issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub exp: i64,
}

/// Issue a token the mock store accepts until `exp`.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn mint_token(exp: DateTime<Utc>) -> Result<String, jsonwebtoken::errors::Error> {
    mint_token_with(exp, SIGNING_SECRET)
}

/// Issue a well-formed token signed with some other key. The client reads
/// its expiry happily; the mock store rejects it with 401.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn mint_forged_token(exp: DateTime<Utc>) -> Result<String, jsonwebtoken::errors::Error> {
    mint_token_with(exp, b"someone-elses-secret")
}

fn mint_token_with(exp: DateTime<Utc>, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &Header::default(),
        &Claims {
            id: ADMIN_ID,
            email: ADMIN_EMAIL.to_string(),
            exp: exp.timestamp(),
        },
        &EncodingKey::from_secret(secret),
    )
}

/// One request as the mock store saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

/// A multipart body as the mock store parsed it.
#[derive(Debug, Clone, Default)]
pub struct RecordedForm {
    /// Text fields in arrival order.
    pub fields: Vec<(String, String)>,
    /// File parts as `(field, filename, size)`.
    pub files: Vec<(String, String, usize)>,
}

impl RecordedForm {
    /// Every value sent under `name`.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Debug, Clone)]
struct ProductRecord {
    id: i64,
    name: String,
    short_description: String,
    long_description: String,
    price: f64,
    image: Option<String>,
    active: bool,
    categories: Vec<i64>,
}

#[derive(Debug, Clone)]
struct CategoryRecord {
    id: i64,
    name: String,
    slug: String,
}

#[derive(Debug, Clone)]
struct PageRecord {
    id: i64,
    title: String,
    slug: String,
    content: String,
}

struct StoreState {
    products: Vec<ProductRecord>,
    categories: Vec<CategoryRecord>,
    pages: Vec<PageRecord>,
    next_id: i64,
    failures: VecDeque<(StatusCode, Option<String>)>,
    requests: Vec<RecordedRequest>,
    forms: Vec<RecordedForm>,
    token_ttl: Duration,
}

impl StoreState {
    fn seeded() -> Self {
        let mut products = vec![
            ProductRecord {
                id: 1,
                name: "Camiseta".to_string(),
                short_description: "Algodón orgánico".to_string(),
                long_description: "Camiseta de algodón orgánico, corte clásico.".to_string(),
                price: 19.99,
                image: Some(SEEDED_IMAGE.to_string()),
                active: true,
                categories: vec![1],
            },
            ProductRecord {
                id: 2,
                name: "Taza".to_string(),
                short_description: String::new(),
                long_description: String::new(),
                price: 7.5,
                image: None,
                active: false,
                categories: vec![2],
            },
        ];
        products.extend((3_i32..=10).map(|n| ProductRecord {
            id: i64::from(n),
            name: format!("Producto {n}"),
            short_description: String::new(),
            long_description: String::new(),
            price: f64::from(n),
            image: None,
            active: true,
            categories: Vec::new(),
        }));

        Self {
            products,
            categories: vec![
                CategoryRecord {
                    id: 1,
                    name: "Ropa".to_string(),
                    slug: "ropa".to_string(),
                },
                CategoryRecord {
                    id: 2,
                    name: "Hogar".to_string(),
                    slug: "hogar".to_string(),
                },
            ],
            pages: vec![
                PageRecord {
                    id: 1,
                    title: "Sobre nosotros".to_string(),
                    slug: "sobre-nosotros".to_string(),
                    content: "Somos una tienda pequeña.".to_string(),
                },
                PageRecord {
                    id: 2,
                    title: "Envíos".to_string(),
                    slug: "envios".to_string(),
                    content: "Enviamos a todo el país.".to_string(),
                },
            ],
            next_id: 100,
            failures: VecDeque::new(),
            requests: Vec::new(),
            forms: Vec::new(),
            token_ttl: Duration::hours(1),
        }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category_names(&self, ids: &[i64]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.categories.iter().find(|c| c.id == *id))
            .map(|c| c.name.clone())
            .collect()
    }

    fn product_json(&self, p: &ProductRecord, detail: bool) -> Value {
        let mut value = json!({
            "id": p.id,
            "nombre": p.name,
            "descripcion_corta": p.short_description,
            "precio": p.price,
            "imagen": p.image,
            "activo": i32::from(p.active),
            "categorias": self.category_names(&p.categories),
        });
        if detail && let Some(object) = value.as_object_mut() {
            object.insert("descripcion_larga".to_string(), json!(p.long_description));
        }
        value
    }
}

struct Shared {
    store: Mutex<StoreState>,
    uploads: PathBuf,
}

type AppState = Arc<Shared>;

/// A running mock store. The server stops and its uploads directory is
/// removed when this is dropped.
pub struct MockStore {
    base_url: Url,
    shared: AppState,
    server: JoinHandle<()>,
}

impl MockStore {
    /// Start on an ephemeral local port with seeded data.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the port or the uploads directory cannot be
    /// set up.
    pub async fn start() -> std::io::Result<Self> {
        let uploads = std::env::temp_dir().join(format!("tienda-mock-uploads-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&uploads).await?;
        tokio::fs::write(uploads.join(SEEDED_IMAGE), SEEDED_IMAGE_BYTES).await?;

        let shared = Arc::new(Shared {
            store: Mutex::new(StoreState::seeded()),
            uploads: uploads.clone(),
        });

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let app = router(Arc::clone(&shared), &uploads);
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            shared,
            server,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Answer the next API request with `status` and an optional
    /// `{"error": message}` body instead of handling it.
    pub async fn fail_next(&self, status: StatusCode, message: Option<&str>) {
        self.shared
            .store
            .lock()
            .await
            .failures
            .push_back((status, message.map(str::to_string)));
    }

    /// Lifetime of tokens issued by `POST /api/login`.
    pub async fn set_token_ttl(&self, ttl: Duration) {
        self.shared.store.lock().await.token_ttl = ttl;
    }

    /// Every API request received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.store.lock().await.requests.clone()
    }

    /// The most recent multipart body received.
    pub async fn last_form(&self) -> Option<RecordedForm> {
        self.shared.store.lock().await.forms.last().cloned()
    }

    /// Category ids currently assigned to a product.
    pub async fn product_category_ids(&self, id: i64) -> Option<Vec<i64>> {
        let store = self.shared.store.lock().await;
        store
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.categories.clone())
    }
}

impl Drop for MockStore {
    fn drop(&mut self) {
        self.server.abort();
        let _ = std::fs::remove_dir_all(&self.shared.uploads);
    }
}

fn router(shared: AppState, uploads: &FsPath) -> Router {
    let api = Router::new()
        .route("/api/login", post(login))
        .route("/api/productos", get(list_products).post(create_product))
        .route(
            "/api/productos/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/categorias", get(list_categories).post(create_category))
        .route(
            "/api/categorias/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/api/paginas", get(list_pages))
        .route("/api/paginas/{slug}", get(get_page))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&shared), record_and_fail));

    api.nest_service("/uploads", ServeDir::new(uploads))
        .with_state(shared)
}

/// Record the request, then serve a queued failure if there is one.
async fn record_and_fail(State(shared): State<AppState>, request: Request, next: Next) -> Response {
    // Only owned values may be held across the lock below: `Request` is not
    // `Sync`, so a live borrow of it would make this future `!Send`.
    let recorded = record(&request);

    let failure = {
        let mut store = shared.store.lock().await;
        store.requests.push(recorded);
        store.failures.pop_front()
    };

    match failure {
        Some((status, Some(message))) => error(status, &message),
        Some((status, None)) => status.into_response(),
        None => next.run(request).await,
    }
}

fn record(request: &Request) -> RecordedRequest {
    let header_value = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        authorization: header_value(header::AUTHORIZATION.as_str()),
        request_id: header_value("x-request-id"),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<Claims, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Token requerido"))?;

    let mut validation = Validation::default();
    validation.leeway = 0;
    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(SIGNING_SECRET), &validation)
        .map(|data| data.claims)
        .map_err(|_| error(StatusCode::UNAUTHORIZED, "Token inválido"))
}

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

async fn login(State(shared): State<AppState>, Json(input): Json<LoginInput>) -> Response {
    if input.email != ADMIN_EMAIL || input.password != ADMIN_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Credenciales inválidas");
    }
    let ttl = shared.store.lock().await.token_ttl;
    match mint_token(Utc::now() + ttl) {
        Ok(token) => Json(json!({
            "token": token,
            "user": { "id": ADMIN_ID, "email": ADMIN_EMAIL },
        }))
        .into_response(),
        Err(_) => error(StatusCode::INTERNAL_SERVER_ERROR, "Error al generar token"),
    }
}

async fn list_products(State(shared): State<AppState>) -> Response {
    let store = shared.store.lock().await;
    let products: Vec<Value> = store
        .products
        .iter()
        .map(|p| store.product_json(p, false))
        .collect();
    Json(products).into_response()
}

async fn get_product(State(shared): State<AppState>, Path(id): Path<i64>) -> Response {
    let store = shared.store.lock().await;
    match store.products.iter().find(|p| p.id == id) {
        Some(p) => Json(store.product_json(p, true)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Producto no encontrado"),
    }
}

/// Product fields from a multipart body.
struct ProductInput {
    name: String,
    short_description: String,
    long_description: String,
    price: f64,
    active: bool,
    categories: Vec<i64>,
    /// Stored filename of a newly uploaded image.
    uploaded: Option<String>,
    current_image: Option<String>,
}

async fn read_product_form(shared: &Shared, mut multipart: Multipart) -> Result<ProductInput, Response> {
    let bad_request = |message: &str| error(StatusCode::BAD_REQUEST, message);
    let mut form = RecordedForm::default();
    let mut uploaded = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Formulario inválido"))?
    {
        let name = field.name().unwrap_or("").to_string();
        if let Some(filename) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| bad_request("Archivo inválido"))?;
            let stored = format!("{}-{filename}", Utc::now().timestamp_millis());
            tokio::fs::write(shared.uploads.join(&stored), &bytes)
                .await
                .map_err(|_| error(StatusCode::INTERNAL_SERVER_ERROR, "No se pudo guardar la imagen"))?;
            form.files.push((name, filename, bytes.len()));
            uploaded = Some(stored);
        } else {
            let text = field
                .text()
                .await
                .map_err(|_| bad_request("Campo inválido"))?;
            form.fields.push((name, text));
        }
    }

    let single = |name: &str| form.values(name).first().map(|v| (*v).to_string());
    let name = single("nombre")
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| bad_request("El nombre es obligatorio"))?;
    let price = single("precio")
        .and_then(|p| p.parse::<f64>().ok())
        .ok_or_else(|| bad_request("Precio inválido"))?;
    let categories = form
        .values("categorias")
        .iter()
        .map(|v| v.parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| bad_request("Categoría inválida"))?;

    let input = ProductInput {
        name,
        short_description: single("descripcion_corta").unwrap_or_default(),
        long_description: single("descripcion_larga").unwrap_or_default(),
        price,
        active: single("activo").as_deref() != Some("0"),
        categories,
        uploaded,
        current_image: single("imagen_actual"),
    };

    shared.store.lock().await.forms.push(form);
    Ok(input)
}

async fn create_product(
    State(shared): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let input = match read_product_form(&shared, multipart).await {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut store = shared.store.lock().await;
    let id = store.allocate_id();
    store.products.push(ProductRecord {
        id,
        name: input.name,
        short_description: input.short_description,
        long_description: input.long_description,
        price: input.price,
        image: input.uploaded,
        active: input.active,
        categories: input.categories,
    });
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Producto creado" })),
    )
        .into_response()
}

async fn update_product(
    State(shared): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let input = match read_product_form(&shared, multipart).await {
        Ok(input) => input,
        Err(response) => return response,
    };

    let mut store = shared.store.lock().await;
    let Some(product) = store.products.iter_mut().find(|p| p.id == id) else {
        return error(StatusCode::NOT_FOUND, "Producto no encontrado");
    };
    product.name = input.name;
    product.short_description = input.short_description;
    product.long_description = input.long_description;
    product.price = input.price;
    product.active = input.active;
    product.categories = input.categories;
    product.image = input
        .uploaded
        .or_else(|| input.current_image.filter(|name| !name.is_empty()));
    Json(json!({ "message": "Producto actualizado" })).into_response()
}

async fn delete_product(
    State(shared): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut store = shared.store.lock().await;
    let before = store.products.len();
    store.products.retain(|p| p.id != id);
    if store.products.len() == before {
        return error(StatusCode::NOT_FOUND, "Producto no encontrado");
    }
    Json(json!({ "message": "Producto eliminado" })).into_response()
}

fn category_json(c: &CategoryRecord) -> Value {
    json!({ "id": c.id, "nombre": c.name, "slug": c.slug })
}

async fn list_categories(State(shared): State<AppState>) -> Response {
    let store = shared.store.lock().await;
    Json(store.categories.iter().map(category_json).collect::<Vec<_>>()).into_response()
}

async fn get_category(State(shared): State<AppState>, Path(id): Path<i64>) -> Response {
    let store = shared.store.lock().await;
    match store.categories.iter().find(|c| c.id == id) {
        Some(c) => Json(category_json(c)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Categoría no encontrada"),
    }
}

#[derive(Deserialize)]
struct CategoryInput {
    nombre: String,
    slug: String,
}

async fn create_category(
    State(shared): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CategoryInput>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut store = shared.store.lock().await;
    if store.categories.iter().any(|c| c.slug == input.slug) {
        return error(StatusCode::BAD_REQUEST, "El slug ya existe");
    }
    let id = store.allocate_id();
    let category = CategoryRecord {
        id,
        name: input.nombre,
        slug: input.slug,
    };
    let body = category_json(&category);
    store.categories.push(category);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_category(
    State(shared): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<CategoryInput>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut store = shared.store.lock().await;
    let Some(category) = store.categories.iter_mut().find(|c| c.id == id) else {
        return error(StatusCode::NOT_FOUND, "Categoría no encontrada");
    };
    category.name = input.nombre;
    category.slug = input.slug;
    Json(category_json(category)).into_response()
}

async fn delete_category(
    State(shared): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut store = shared.store.lock().await;
    let before = store.categories.len();
    store.categories.retain(|c| c.id != id);
    if store.categories.len() == before {
        return error(StatusCode::NOT_FOUND, "Categoría no encontrada");
    }
    for product in &mut store.products {
        product.categories.retain(|c| *c != id);
    }
    Json(json!({ "message": "Categoría eliminada" })).into_response()
}

async fn list_pages(State(shared): State<AppState>) -> Response {
    let store = shared.store.lock().await;
    let pages: Vec<Value> = store
        .pages
        .iter()
        .map(|p| json!({ "id": p.id, "titulo": p.title, "slug": p.slug }))
        .collect();
    Json(pages).into_response()
}

async fn get_page(State(shared): State<AppState>, Path(slug): Path<String>) -> Response {
    let store = shared.store.lock().await;
    match store.pages.iter().find(|p| p.slug == slug) {
        Some(p) => Json(json!({
            "id": p.id,
            "titulo": p.title,
            "slug": p.slug,
            "contenido": p.content,
        }))
        .into_response(),
        None => error(StatusCode::NOT_FOUND, "Página no encontrada"),
    }
}

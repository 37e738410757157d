use axum::{
    extract::{rejection::FormRejection, FromRef, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::dto::{IndexPage, RegistroForm, UsuarioView};
use crate::{
    flash::{self, Flash, FlashKeys, IncomingFlash},
    state::AppState,
    store::UserRecord,
    views,
};

pub const MISSING_FIELDS: &str = "Todos los campos son obligatorios";
pub const INSERT_FAILED: &str = "Error al registrar el usuario. Intenta de nuevo.";
pub const LOAD_FAILED: &str = "No se pudieron cargar los usuarios.";
pub const CONNECTION_OK: &str = "✅ Conexión a la base de datos exitosa!";
pub const CONNECTION_FAILED: &str = "❌ Error de conexión a la base de datos";

pub fn welcome(name: &str) -> String {
    format!("¡Bienvenido al Registro de Usuarios de Diferentes Países, {name}!")
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/registro", post(registro))
        .route("/test", get(test_connection))
}

pub fn api_routes() -> Router<AppState> {
    Router::new().route("/api/usuarios", get(list_usuarios))
}

#[instrument(skip(state, flash))]
pub async fn index(
    State(state): State<AppState>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, (StatusCode, String)> {
    let (usuarios, load_error) = match state.store.list_all().await {
        Ok(users) => (users, None),
        Err(e) => {
            error!(error = %e, "could not load users for index");
            (Vec::new(), Some(LOAD_FAILED.to_string()))
        }
    };

    let consumed = flash.is_some();
    let page = IndexPage {
        usuarios: usuarios.iter().map(UsuarioView::from).collect(),
        flash,
        load_error,
    };
    let html = views::render_index(&page).map_err(|e| {
        error!(error = %e, "render index failed");
        internal(e)
    })?;

    if consumed {
        Ok(([(header::SET_COOKIE, flash::clear_cookie())], Html(html)).into_response())
    } else {
        Ok(Html(html).into_response())
    }
}

#[instrument(skip(state, form))]
pub async fn registro(
    State(state): State<AppState>,
    form: Result<Form<RegistroForm>, FormRejection>,
) -> Result<Response, (StatusCode, String)> {
    // A body that is not urlencoded carries none of the fields
    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => {
            warn!(error = %e, "registration body not readable as a form");
            RegistroForm::default()
        }
    };

    let notice = match form.validate() {
        Err(e) => {
            warn!(error = %e, "incomplete registration form");
            Flash::error(MISSING_FIELDS)
        }
        Ok(new_user) => match state.store.insert(&new_user).await {
            Ok(id) => {
                info!(id, nombre = %new_user.name, "user registered");
                Flash::success(welcome(&new_user.name))
            }
            Err(e) => {
                error!(error = %e, "registration failed");
                Flash::error(INSERT_FAILED)
            }
        },
    };

    let keys = FlashKeys::from_ref(&state);
    let cookie = keys.set_cookie(&notice).map_err(|e| {
        error!(error = %e, "flash sign failed");
        internal(e)
    })?;

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

#[instrument(skip(state))]
pub async fn list_usuarios(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserRecord>>, (StatusCode, String)> {
    match state.store.list_all().await {
        Ok(users) => Ok(Json(users)),
        Err(e) => {
            error!(error = %e, "list users failed");
            Err((StatusCode::SERVICE_UNAVAILABLE, LOAD_FAILED.into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn test_connection(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.store.check_connectivity().await {
        (StatusCode::OK, CONNECTION_OK)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, CONNECTION_FAILED)
    }
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

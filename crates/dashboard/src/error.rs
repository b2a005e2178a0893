//! Unified error handling and user-facing notices.
//!
//! Every failed action collapses to one of two notices: the backend's own
//! validation message (signup only) or a generic "service unavailable".
//! Unexpected failures are reported to Sentry before they are shown.

use std::fmt;

use thiserror::Error;

use seller_dashboard_core::{EmailError, PriceError, ProductId, ProductPhase};

use crate::api::ApiError;
use crate::storage::StorageError;

/// Dashboard-level error type. All view operations return `Result<T, DashboardError>`.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persisted slot could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Action needs a signed-in seller and there is none.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Another mutation of the same view is still in flight.
    #[error("Another operation is in progress")]
    Busy,

    /// Form input could not be parsed. Carries the seller-facing description.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Product is not in the local catalog.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Product is mid-operation and cannot take this one.
    #[error("Product {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: ProductId,
        from: ProductPhase,
        to: ProductPhase,
    },
}

impl From<EmailError> for DashboardError {
    fn from(err: EmailError) -> Self {
        let message = match err {
            EmailError::Empty => "Informe o e-mail.",
            EmailError::TooLong { .. } => "O e-mail é longo demais.",
            EmailError::MissingAtSymbol | EmailError::EmptyLocalPart | EmailError::EmptyDomain => {
                "Informe um e-mail válido."
            }
        };
        tracing::debug!(error = %err, "rejected email input");
        Self::InvalidInput(message.to_owned())
    }
}

impl From<PriceError> for DashboardError {
    fn from(err: PriceError) -> Self {
        let message = match err {
            PriceError::Empty => "Informe o preço.",
            PriceError::NotANumber(_) => "O preço deve ser um número, por exemplo 95.00.",
            PriceError::Negative => "O preço não pode ser negativo.",
        };
        tracing::debug!(error = %err, "rejected price input");
        Self::InvalidInput(message.to_owned())
    }
}

impl DashboardError {
    /// Whether the failure came from a view being torn down mid-request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Api(ApiError::Cancelled))
    }

    /// The notice to show for this failure.
    ///
    /// Backend validation messages are shown verbatim; everything else uses
    /// the context's generic copy.
    #[must_use]
    pub fn notice(&self, context: NoticeContext) -> Notice {
        if let Self::Api(err) = self
            && let Some(message) = err.validation_message()
        {
            return Notice::new(context.failure_title(), message);
        }
        if let Self::InvalidInput(message) = self {
            return Notice::new("Dados inválidos", message);
        }
        context.failure()
    }

    /// Log the failure, sending unexpected ones to Sentry.
    pub fn report(&self, action: &str) {
        match self {
            Self::Storage(_) | Self::Api(ApiError::Decode(_) | ApiError::Url(_)) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    action,
                    sentry_event_id = %event_id,
                    "Dashboard action failed"
                );
            }
            Self::Api(ApiError::Cancelled) => {
                tracing::debug!(action, "Dashboard action cancelled");
            }
            _ => tracing::warn!(error = %self, action, "Dashboard action failed"),
        }
    }
}

/// A short message for the seller about the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    /// Build a notice from a title and description.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// The generic failure notice.
    #[must_use]
    pub fn service_unavailable() -> Self {
        Self::new("Serviço indisponível", "Tente novamente mais tarde")
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// The action a notice is about; picks the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    Login,
    Signup,
    Profile,
    Password,
    ProductList,
    ProductCreate,
    ProductUpdate,
    ProductDelete,
}

impl NoticeContext {
    /// Copy shown when the action succeeds.
    #[must_use]
    pub fn success(self) -> Notice {
        match self {
            Self::Login => Notice::new("Bem-vindo!", "Login realizado com sucesso."),
            Self::Signup => Notice::new("Cadastro realizado!", "Sua conta foi criada com sucesso."),
            Self::Profile => Notice::new(
                "Perfil atualizado!",
                "Suas informações foram salvas com sucesso.",
            ),
            Self::Password => Notice::new(
                "Senha atualizada!",
                "Sua nova senha foi salva com sucesso.",
            ),
            Self::ProductList => Notice::new("Produtos carregados", "Catálogo atualizado."),
            Self::ProductCreate => {
                Notice::new("Produto criado!", "Novo produto adicionado com sucesso.")
            }
            Self::ProductUpdate => Notice::new(
                "Produto atualizado!",
                "As alterações foram salvas com sucesso.",
            ),
            Self::ProductDelete => {
                Notice::new("Produto removido", "O produto foi excluído com sucesso.")
            }
        }
    }

    /// Copy shown when the action fails for a non-specific reason.
    #[must_use]
    pub fn failure(self) -> Notice {
        match self {
            Self::Signup => Notice::new(self.failure_title(), "Tente novamente mais tarde."),
            Self::Profile => Notice::new(
                self.failure_title(),
                "Suas informações não puderam ser salvas",
            ),
            Self::Password => Notice::new(
                self.failure_title(),
                "Não foi possível atualizar sua senha. Tente novamente.",
            ),
            _ => Notice::service_unavailable(),
        }
    }

    const fn failure_title(self) -> &'static str {
        match self {
            Self::Signup => "Erro ao cadastrar",
            Self::Password => "Erro ao atualizar senha",
            _ => "Serviço indisponível",
        }
    }
}

//! Profile show/update.

use seller_dashboard::views::ProfileField;
use seller_dashboard::{Dashboard, Route, error::NoticeContext};
use seller_dashboard_core::HourField;

use super::CliError;
use crate::ProfileArgs;

fn format_hour(hour: f64) -> String {
    if hour.is_nan() {
        "-".to_owned()
    } else {
        format!("{hour}h")
    }
}

/// Print the signed-in seller's profile.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` if no session can be restored.
pub async fn show(dashboard: &Dashboard) -> Result<(), CliError> {
    let (_shell, scope) = super::mount(dashboard, Route::Profile).await?;
    let editor = dashboard.profile_editor(scope)?;
    let form = editor.form();

    tracing::info!("Nome: {}", form.full_name);
    tracing::info!("Email: {}", form.email);
    tracing::info!("Telefone: {}", form.phone);
    tracing::info!(
        "Endereço: {}, {}{} - {}, {}/{} {}",
        form.street,
        form.number,
        form.complement
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default(),
        form.neighborhood,
        form.city,
        form.state,
        form.zip_code
    );
    tracing::info!(
        "Horário: {} - {}",
        format_hour(form.opening_hours.start),
        format_hour(form.opening_hours.end)
    );
    Ok(())
}

/// Apply the given fields and submit the whole profile.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without a session, or the profile notice
/// when a field is invalid or the backend rejects the update.
pub async fn update(dashboard: &Dashboard, args: ProfileArgs) -> Result<(), CliError> {
    let (_shell, scope) = super::mount(dashboard, Route::Profile).await?;
    let mut editor = dashboard.profile_editor(scope)?;

    let fields = [
        (ProfileField::FullName, args.full_name),
        (ProfileField::Email, args.email),
        (ProfileField::Phone, args.phone),
        (ProfileField::Street, args.street),
        (ProfileField::Number, args.number),
        (ProfileField::Complement, args.complement),
        (ProfileField::Neighborhood, args.neighborhood),
        (ProfileField::City, args.city),
        (ProfileField::State, args.state),
        (ProfileField::ZipCode, args.zip_code),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            editor
                .set_field(field, &value)
                .map_err(|e| CliError::action(NoticeContext::Profile, "update profile", e))?;
        }
    }
    if let Some(opens) = args.opens {
        editor.set_opening_hour(HourField::Start, &opens);
    }
    if let Some(closes) = args.closes {
        editor.set_opening_hour(HourField::End, &closes);
    }

    let notice = editor
        .submit()
        .await
        .map_err(|e| CliError::action(NoticeContext::Profile, "update profile", e))?;
    tracing::info!("{notice}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(8.0), "8h");
        assert_eq!(format_hour(17.5), "17.5h");
        assert_eq!(format_hour(f64::NAN), "-");
    }
}

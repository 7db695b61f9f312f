//! The steps that turn the client and check named in a transaction request
//! into row ids, creating rows where needed.

use rusqlite::Connection;

use crate::{
    Error,
    check::{
        CheckId, CheckNumber, check_number_taken, find_check_by_number, get_check, insert_check,
        update_check_number,
    },
    client::{ClientId, find_client_by_name, get_visible_client, insert_client},
    error::Resource,
    session::{SessionId, ensure_owner, is_visible},
    transaction::TransactionKind,
};

/// Split a full name into a first name and the remaining words as the last name.
///
/// Returns `None` if `name` has no words.
pub fn split_name(name: &str) -> Option<(&str, Option<String>)> {
    let mut words = name.split_whitespace();
    let first_name = words.next()?;
    let last_name = words.collect::<Vec<_>>().join(" ");

    Some((first_name, (!last_name.is_empty()).then_some(last_name)))
}

/// Find the client a transaction refers to.
///
/// An explicit `client_id` is used as is. Otherwise `client_name` is split
/// into a first and last name and matched with [find_client_by_name], and a
/// new client owned by `session_id` is created if none matches. A missing or
/// blank name means no client.
///
/// # Errors
/// Returns [Error::InvalidClient] if `client_id` is not visible to `session_id`.
pub fn resolve_client(
    client_id: Option<ClientId>,
    client_name: Option<&str>,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Option<ClientId>, Error> {
    if let Some(client_id) = client_id {
        return get_visible_client(client_id, session_id, connection).map(|client| Some(client.id));
    }

    let Some((first_name, last_name)) = client_name.and_then(split_name) else {
        return Ok(None);
    };

    if let Some(client) =
        find_client_by_name(first_name, last_name.as_deref(), session_id, connection)?
    {
        return Ok(Some(client.id));
    }

    let client = insert_client(first_name, last_name.as_deref(), session_id, connection)?;
    tracing::debug!("Created client {} for session {session_id}", client.id);

    Ok(Some(client.id))
}

/// Find or create the check for a new transaction.
///
/// Only check payments with a non-empty number get a check. An existing check
/// visible to `session_id` with the same number is reused.
pub fn resolve_check_for_create(
    kind: TransactionKind,
    number: Option<&CheckNumber>,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Option<CheckId>, Error> {
    let Some(number) = check_payment_number(kind, number) else {
        return Ok(None);
    };

    if let Some(check) = find_check_by_number(number, session_id, connection)? {
        return Ok(Some(check.id));
    }

    insert_check(number, session_id, connection).map(|check| Some(check.id))
}

/// Find, update or create the check for an updated transaction.
///
/// `check_id` is the check named by the request or, failing that, the one
/// the transaction already has. If that check exists and is visible its
/// number is changed in place when it differs from `number`. Otherwise the
/// visible check with `number` is reused, or a new one is created. Without a
/// number the current check is kept.
///
/// # Errors
/// Returns [Error::InvalidCheck] if `check_id` is kept but not visible to
/// `session_id`, [Error::DuplicateCheckNumber] if another visible check
/// already has `number`, and [Error::BaseRecord] or [Error::ForeignSession]
/// if the number of a check the caller does not own would have to change.
pub fn resolve_check_for_edit(
    kind: TransactionKind,
    check_id: Option<CheckId>,
    number: Option<&CheckNumber>,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Option<CheckId>, Error> {
    if kind != TransactionKind::PagoCheque {
        return Ok(None);
    }

    let Some(number) = check_payment_number(kind, number) else {
        return check_id
            .map(|id| get_visible_check(id, session_id, connection))
            .transpose();
    };

    let current = match check_id.map(|id| get_check(id, connection)).transpose() {
        Ok(check) => check.filter(|check| is_visible(check.session_id.as_deref(), session_id)),
        Err(Error::NotFound(_)) => None,
        Err(error) => return Err(error),
    };

    match current {
        Some(check) if check.number == number.as_str() => Ok(Some(check.id)),
        Some(check) => {
            ensure_owner(check.session_id.as_deref(), session_id, Resource::Check)?;
            if check_number_taken(number, session_id, Some(check.id), connection)? {
                return Err(Error::DuplicateCheckNumber(number.to_string()));
            }

            update_check_number(check.id, number, connection)?;
            Ok(Some(check.id))
        }
        None => resolve_check_for_create(kind, Some(number), session_id, connection),
    }
}

/// The id of the check `id` if it is visible to `session_id`.
fn get_visible_check(
    id: CheckId,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<CheckId, Error> {
    match get_check(id, connection) {
        Ok(check) if is_visible(check.session_id.as_deref(), session_id) => Ok(check.id),
        Ok(_) | Err(Error::NotFound(_)) => Err(Error::InvalidCheck(id)),
        Err(error) => Err(error),
    }
}

fn check_payment_number(
    kind: TransactionKind,
    number: Option<&CheckNumber>,
) -> Option<&CheckNumber> {
    match kind {
        TransactionKind::PagoCheque => number.filter(|number| !number.is_empty()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        check::{CheckNumber, get_check, insert_check},
        client::{get_client, insert_client},
        error::Resource,
        session::SessionId,
        test_utils::{insert_base_check, insert_base_client, must_create_test_connection},
        transaction::TransactionKind,
    };

    use super::{resolve_check_for_create, resolve_check_for_edit, resolve_client, split_name};

    #[test]
    fn splits_first_word_from_rest() {
        assert_eq!(
            split_name("  Juan  Carlos Perez "),
            Some(("Juan", Some("Carlos Perez".to_owned())))
        );
        assert_eq!(split_name("Acme"), Some(("Acme", None)));
        assert_eq!(split_name("   "), None);
    }

    #[test]
    fn reuses_client_matching_name() {
        let connection = must_create_test_connection();
        let id = insert_base_client("Juan", Some("Perez"), &connection);

        let resolved =
            resolve_client(None, Some("Juan Perez"), &SessionId::new("a"), &connection).unwrap();

        assert_eq!(resolved, Some(id));
    }

    #[test]
    fn creates_client_owned_by_session() {
        let connection = must_create_test_connection();
        let session_id = SessionId::new("a");

        let id = resolve_client(None, Some("Ana Gomez"), &session_id, &connection)
            .unwrap()
            .unwrap();

        let client = get_client(id, &connection).unwrap();
        assert_eq!(client.first_name, "Ana");
        assert_eq!(client.last_name.as_deref(), Some("Gomez"));
        assert_eq!(client.session_id.as_deref(), Some("a"));
    }

    #[test]
    fn blank_name_means_no_client() {
        let connection = must_create_test_connection();

        assert_eq!(
            resolve_client(None, Some(" "), &SessionId::new("a"), &connection),
            Ok(None)
        );
    }

    #[test]
    fn explicit_client_must_be_visible() {
        let connection = must_create_test_connection();
        let client = insert_client("Ana", None, &SessionId::new("b"), &connection).unwrap();

        assert_eq!(
            resolve_client(Some(client.id), None, &SessionId::new("a"), &connection),
            Err(Error::InvalidClient(client.id))
        );
    }

    #[test]
    fn only_check_payments_get_checks() {
        let connection = must_create_test_connection();
        let number = CheckNumber::new("1");

        let resolved = resolve_check_for_create(
            TransactionKind::Pago,
            Some(&number),
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Ok(None));
    }

    #[test]
    fn reuses_visible_check_with_same_number() {
        let connection = must_create_test_connection();
        let id = insert_base_check("1001", &connection);

        let resolved = resolve_check_for_create(
            TransactionKind::PagoCheque,
            Some(&CheckNumber::new("1001")),
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Ok(Some(id)));
    }

    #[test]
    fn edit_changes_number_in_place() {
        let connection = must_create_test_connection();
        let session_id = SessionId::new("a");
        let check = insert_check(&CheckNumber::new("1001"), &session_id, &connection).unwrap();

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            Some(check.id),
            Some(&CheckNumber::new("1002")),
            &session_id,
            &connection,
        );

        assert_eq!(resolved, Ok(Some(check.id)));
        assert_eq!(get_check(check.id, &connection).unwrap().number, "1002");
    }

    #[test]
    fn edit_creates_check_when_there_is_none() {
        let connection = must_create_test_connection();
        let session_id = SessionId::new("a");

        let id = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            None,
            Some(&CheckNumber::new("7")),
            &session_id,
            &connection,
        )
        .unwrap()
        .unwrap();

        assert_eq!(get_check(id, &connection).unwrap().number, "7");
    }

    #[test]
    fn edit_cannot_renumber_base_check() {
        let connection = must_create_test_connection();
        let id = insert_base_check("1", &connection);

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            Some(id),
            Some(&CheckNumber::new("2")),
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Err(Error::BaseRecord(Resource::Check)));
    }

    #[test]
    fn edit_without_number_keeps_check() {
        let connection = must_create_test_connection();
        let id = insert_base_check("1", &connection);

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            Some(id),
            None,
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Ok(Some(id)));
    }

    #[test]
    fn edit_without_number_rejects_foreign_check() {
        let connection = must_create_test_connection();
        let check = insert_check(&CheckNumber::new("1"), &SessionId::new("b"), &connection).unwrap();

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            Some(check.id),
            None,
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Err(Error::InvalidCheck(check.id)));
    }

    #[test]
    fn edit_without_number_rejects_missing_check() {
        let connection = must_create_test_connection();

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            Some(42),
            None,
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Err(Error::InvalidCheck(42)));
    }

    #[test]
    fn edit_cannot_renumber_onto_existing_number() {
        let connection = must_create_test_connection();
        let session_id = SessionId::new("a");
        insert_base_check("1001", &connection);
        let check = insert_check(&CheckNumber::new("2001"), &session_id, &connection).unwrap();

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            Some(check.id),
            Some(&CheckNumber::new("1001")),
            &session_id,
            &connection,
        );

        assert_eq!(
            resolved,
            Err(Error::DuplicateCheckNumber("1001".to_owned()))
        );
        assert_eq!(get_check(check.id, &connection).unwrap().number, "2001");
    }

    #[test]
    fn edit_reuses_visible_check_when_there_is_none() {
        let connection = must_create_test_connection();
        let id = insert_base_check("1001", &connection);

        let resolved = resolve_check_for_edit(
            TransactionKind::PagoCheque,
            None,
            Some(&CheckNumber::new("1001")),
            &SessionId::new("a"),
            &connection,
        );

        assert_eq!(resolved, Ok(Some(id)));
    }
}

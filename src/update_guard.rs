//! Overwrites a record's attributes after checking the caller owns it.

use crate::{
    Error,
    auth::UserId,
    ownership::OwnershipChecker,
    record::{Attributes, RecordId},
    stores::EntityStore,
};

/// Overwrite the record with `id` with `attributes` on behalf of `user_id`.
///
/// The kind of record is taken from `attributes`. Ownership is always
/// checked before the update is issued.
///
/// # Errors
/// - [Error::Unauthorized] if the user does not own the record or ownership
///   could not be confirmed. Nothing is written.
/// - [Error::NotFound] if the record disappeared between the check and the
///   update.
/// - [Error::Storage] if the update failed.
pub fn update(
    store: &dyn EntityStore,
    id: RecordId,
    user_id: &UserId,
    attributes: &Attributes,
) -> Result<(), Error> {
    let kind = attributes.kind();

    OwnershipChecker::new(store)
        .check(user_id, kind, id)
        .require()?;

    let rows_affected = store.update_record(id, attributes).map_err(|error| {
        tracing::error!("Could not update {kind} {id}: {error}");
        Error::Storage(error)
    })?;

    if rows_affected == 0 {
        tracing::warn!("Update of {kind} {id} matched no rows");
        return Err(Error::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        auth::UserId,
        record::{Attributes, EntityKind, Record},
        stores::{EntityStore, LinkTable, OwnershipTable},
        test_utils::{Fault, FaultyStore, insert_owned},
    };

    use super::update;

    fn payee(name: &str) -> Attributes {
        Attributes::Payee {
            name: name.to_owned(),
        }
    }

    #[test]
    fn owner_can_update() {
        let store = FaultyStore::new();
        let payee_id = insert_owned(&store, payee("Grocer"), "U1");

        let result = update(&store, payee_id, &UserId::new("U1"), &payee("Greengrocer"));

        assert_eq!(result, Ok(()));
        let records = store.select_records(EntityKind::Payee, &[payee_id]).unwrap();
        assert!(matches!(&records[..], [Record::Payee(payee)] if payee.name == "Greengrocer"));
    }

    #[test]
    fn non_owner_is_unauthorized_and_nothing_is_written() {
        let store = FaultyStore::new();
        let payee_id = insert_owned(&store, payee("Grocer"), "U1");
        store.reset_calls();

        let result = update(&store, payee_id, &UserId::new("U2"), &payee("Greengrocer"));

        assert_eq!(result, Err(Error::Unauthorized));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn non_owner_is_unauthorized_whatever_the_attributes() {
        let store = FaultyStore::new();
        let account_id = insert_owned(
            &store,
            Attributes::Account {
                name: "Checking".to_owned(),
                balance: 0.0,
            },
            "U1",
        );

        for attributes in [
            Attributes::Account {
                name: "Savings".to_owned(),
                balance: 10.0,
            },
            Attributes::Account {
                name: String::new(),
                balance: f64::NAN,
            },
        ] {
            assert_eq!(
                update(&store, account_id, &UserId::new("U2"), &attributes),
                Err(Error::Unauthorized)
            );
        }
    }

    #[test]
    fn ownership_check_failure_is_unauthorized() {
        let store = FaultyStore::new().fail_on(Fault::FindOwnership(OwnershipTable::Payee));
        let payee_id = insert_owned(&store, payee("Grocer"), "U1");

        let result = update(&store, payee_id, &UserId::new("U1"), &payee("Greengrocer"));

        assert_eq!(result, Err(Error::Unauthorized));
    }

    #[test]
    fn update_failure_is_a_storage_error() {
        let store = FaultyStore::new().fail_on(Fault::UpdateRecord(EntityKind::Payee));
        let payee_id = insert_owned(&store, payee("Grocer"), "U1");

        let result = update(&store, payee_id, &UserId::new("U1"), &payee("Greengrocer"));

        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn transaction_update_is_guarded_by_its_account() {
        let store = FaultyStore::new();
        let account_id = insert_owned(
            &store,
            Attributes::Account {
                name: "Checking".to_owned(),
                balance: 0.0,
            },
            "U1",
        );
        let transaction_id = store
            .insert_record(&Attributes::Transaction {
                amount: -3.5,
                date: date!(2024 - 02 - 29),
            })
            .unwrap();
        store
            .insert_link(LinkTable::TransactionAccount, transaction_id, account_id)
            .unwrap();
        let new_attributes = Attributes::Transaction {
            amount: -4.0,
            date: date!(2024 - 03 - 01),
        };

        assert_eq!(
            update(&store, transaction_id, &UserId::new("U2"), &new_attributes),
            Err(Error::Unauthorized)
        );
        assert_eq!(
            update(&store, transaction_id, &UserId::new("U1"), &new_attributes),
            Ok(())
        );
    }
}

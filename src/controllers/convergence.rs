/// Decision taken for one sub-resource in a pass.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileAction<R> {
    NoAction,
    Create(R),
    /// Not produced by [`decide`] yet: existing objects are never patched
    /// implicitly until a diff policy exists.
    Update(R),
    /// The object exists but is no longer declared. Its removal is left to
    /// owner-reference garbage collection.
    Unmanaged,
}

/// Compares the desired and observed value of one resource kind.
pub fn decide<R>(desired: Option<R>, observed: Option<R>) -> ReconcileAction<R> {
    match (desired, observed) {
        (None, None) => ReconcileAction::NoAction,
        (Some(desired), None) => ReconcileAction::Create(desired),
        // TODO: compare desired against observed and emit Update once a diff policy is defined.
        (Some(_), Some(_)) => ReconcileAction::NoAction,
        (None, Some(_)) => ReconcileAction::Unmanaged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Service;
    use kube::api::ObjectMeta;

    fn service(name: &str) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn nothing_declared_nothing_exists() {
        assert_eq!(decide::<Service>(None, None), ReconcileAction::NoAction);
        assert_eq!(decide::<u32>(None, None), ReconcileAction::NoAction);
    }

    #[test]
    fn declared_and_missing_is_created() {
        let desired = service("wordcount-jobmanager");
        assert_eq!(
            decide(Some(desired.clone()), None),
            ReconcileAction::Create(desired)
        );
        assert_eq!(decide(Some(7u32), None), ReconcileAction::Create(7));
    }

    #[test]
    fn existing_object_is_left_untouched() {
        let desired = service("wordcount-jobmanager");
        let mut observed = desired.clone();
        observed.metadata.resource_version = Some("42".into());

        assert_eq!(decide(Some(desired), Some(observed)), ReconcileAction::NoAction);
        assert_eq!(decide(Some(1u32), Some(2u32)), ReconcileAction::NoAction);
    }

    #[test]
    fn undeclared_object_is_unmanaged() {
        assert_eq!(
            decide(None, Some(service("leftover"))),
            ReconcileAction::Unmanaged
        );
        assert_eq!(decide(None, Some(3u32)), ReconcileAction::Unmanaged);
    }
}

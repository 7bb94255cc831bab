//! CardFieldsService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use cardfields_types::{
        ApiErrorCode, Approval, CallbackError, CardError, CardProps, FacilitatorAuth, FieldIssue,
        FieldKind, GatewayError, OrderId, PaymentSource, ProcessorGateway, SubmitError, VaultAuth,
        VaultSetupToken,
    };

    use crate::{CardFieldsService, FormRegistry, SubmitOptions};

    /// Recording gateway for testing the service layer. `fail_next` makes
    /// the next call fail once, then the gateway succeeds again.
    pub struct MockGateway {
        confirms: Mutex<Vec<(OrderId, PaymentSource, FacilitatorAuth)>>,
        updates: Mutex<Vec<(VaultSetupToken, PaymentSource, VaultAuth)>>,
        failure: Mutex<Option<GatewayError>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self {
                confirms: Mutex::new(Vec::new()),
                updates: Mutex::new(Vec::new()),
                failure: Mutex::new(None),
            }
        }

        pub fn fail_next(&self, error: GatewayError) {
            *self.failure.lock().unwrap() = Some(error);
        }

        pub fn confirm_count(&self) -> usize {
            self.confirms.lock().unwrap().len()
        }

        pub fn update_count(&self) -> usize {
            self.updates.lock().unwrap().len()
        }

        pub fn last_confirm(&self) -> (OrderId, PaymentSource, FacilitatorAuth) {
            self.confirms.lock().unwrap().last().cloned().unwrap()
        }

        pub fn last_update(&self) -> (VaultSetupToken, PaymentSource, VaultAuth) {
            self.updates.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ProcessorGateway for MockGateway {
        async fn confirm_order(
            &self,
            order_id: &OrderId,
            payment_source: &PaymentSource,
            auth: &FacilitatorAuth,
        ) -> Result<(), GatewayError> {
            self.confirms.lock().unwrap().push((
                order_id.clone(),
                payment_source.clone(),
                auth.clone(),
            ));
            match self.failure.lock().unwrap().take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        async fn update_vault_setup_token(
            &self,
            setup_token: &VaultSetupToken,
            payment_source: &PaymentSource,
            auth: &VaultAuth,
        ) -> Result<(), GatewayError> {
            self.updates.lock().unwrap().push((
                setup_token.clone(),
                payment_source.clone(),
                auth.clone(),
            ));
            match self.failure.lock().unwrap().take() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    /// A registry with the required fields mounted and a valid Visa typed in.
    fn mounted_registry() -> Arc<FormRegistry> {
        let registry = Arc::new(FormRegistry::new());
        registry.mount(FieldKind::Number);
        registry.mount(FieldKind::Expiry);
        registry.mount(FieldKind::Cvv);
        registry.set_value(FieldKind::Number, "4111 1111 1111 1111");
        registry.set_value(FieldKind::Expiry, "11/99");
        registry.set_value(FieldKind::Cvv, "123");
        registry
    }

    fn declined_envelope() -> GatewayError {
        GatewayError::Api {
            status: 422,
            name: "UNPROCESSABLE_ENTITY".to_string(),
            message: "The request is semantically incorrect".to_string(),
            details: vec![FieldIssue {
                field: "/payment_source/card/security_code".to_string(),
                issue: "VALIDATION_ERROR".to_string(),
                description: Some("Invalid security code".to_string()),
            }],
        }
    }

    #[tokio::test]
    async fn test_purchase_flow_confirms_order_then_approves() {
        let gateway = Arc::new(MockGateway::new());
        let approvals = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(AtomicUsize::new(0));

        let approvals_tap = approvals.clone();
        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .on_approve(move |approval: Approval| {
                let approvals = approvals_tap.clone();
                async move {
                    approvals.lock().unwrap().push(approval);
                    Ok::<_, CallbackError>(())
                }
            })
            .on_error(move |_: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let approval = service
            .submit(SubmitOptions::new("A21AAGdzcGVjaWFs"))
            .await
            .unwrap();

        let order_id: OrderId = "5O190127TN364715T".parse().unwrap();
        assert_eq!(
            approval,
            Approval::Purchase {
                order_id: order_id.clone()
            }
        );
        assert_eq!(gateway.confirm_count(), 1);

        let (confirmed_id, payment_source, auth) = gateway.last_confirm();
        assert_eq!(confirmed_id, order_id);
        assert_eq!(payment_source.card.number, "4111111111111111");
        assert_eq!(payment_source.card.expiry, "2099-11");
        assert_eq!(auth.access_token, "A21AAGdzcGVjaWFs");
        assert_eq!(auth.partner_attribution_id, "");

        assert_eq!(approvals.lock().unwrap().len(), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_vault_flow_attaches_card_to_setup_token() {
        let gateway = Arc::new(MockGateway::new());
        let approvals = Arc::new(Mutex::new(Vec::new()));

        let approvals_tap = approvals.clone();
        let props = CardProps::builder("client-1")
            .user_id_token("eyJraWQi.eyJpc3Mi.sig")
            .create_vault_setup_token(|| async {
                Ok::<_, CallbackError>("4G4976714T5788300".to_string())
            })
            .on_approve(move |approval: Approval| {
                let approvals = approvals_tap.clone();
                async move {
                    approvals.lock().unwrap().push(approval);
                    Ok::<_, CallbackError>(())
                }
            })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let approval = service
            .submit(SubmitOptions::new("A21AAGdzcGVjaWFs"))
            .await
            .unwrap();

        let setup_token: VaultSetupToken = "4G4976714T5788300".parse().unwrap();
        assert_eq!(
            approval,
            Approval::Vault {
                vault_setup_token: setup_token.clone()
            }
        );
        assert_eq!(gateway.update_count(), 1);
        assert_eq!(gateway.confirm_count(), 0);

        let (updated_token, _, auth) = gateway.last_update();
        assert_eq!(updated_token, setup_token);
        assert_eq!(auth.client_id, "client-1");
        assert_eq!(auth.id_token.as_deref(), Some("eyJraWQi.eyJpc3Mi.sig"));
        assert_eq!(approvals.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_order_must_resolve_with_plausible_id() {
        let gateway = Arc::new(MockGateway::new());
        let errors = Arc::new(Mutex::new(Vec::new()));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("order id with spaces".to_string()) })
            .on_error(move |error: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.lock().unwrap().push(error);
                }
            })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let result = service.submit(SubmitOptions::new("A21AAGdzcGVjaWFs")).await;

        assert!(matches!(result, Err(SubmitError::OrderIdType)));
        assert_eq!(gateway.confirm_count(), 0);

        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SubmitError::OrderIdType));
    }

    #[tokio::test]
    async fn test_create_vault_setup_token_must_resolve_with_plausible_token() {
        let gateway = Arc::new(MockGateway::new());
        let errors = Arc::new(AtomicUsize::new(0));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_vault_setup_token(|| async { Ok::<_, CallbackError>(String::new()) })
            .on_approve(|_: Approval| async { Ok::<_, CallbackError>(()) })
            .on_error(move |_: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let result = service.submit(SubmitOptions::new("A21AAGdzcGVjaWFs")).await;

        assert!(matches!(result, Err(SubmitError::VaultTokenType)));
        assert_eq!(gateway.update_count(), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_callback_failure_keeps_its_message() {
        let gateway = Arc::new(MockGateway::new());
        let errors = Arc::new(Mutex::new(Vec::new()));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Err::<String, _>(CallbackError::new("no order for you")) })
            .on_error(move |error: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.lock().unwrap().push(error);
                }
            })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let err = service
            .submit(SubmitOptions::new("A21AAGdzcGVjaWFs"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no order for you");
        assert_eq!(errors.lock().unwrap()[0].to_string(), "no order for you");
        assert_eq!(gateway.confirm_count(), 0);
    }

    #[tokio::test]
    async fn test_unmounted_form_fails_without_reporting() {
        let gateway = Arc::new(MockGateway::new());
        let errors = Arc::new(AtomicUsize::new(0));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .on_error(move |_: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let registry = Arc::new(FormRegistry::new());
        registry.mount(FieldKind::Number);
        let service = CardFieldsService::new(gateway.clone(), registry, props);
        let result = service.submit(SubmitOptions::new("A21AAGdzcGVjaWFs")).await;

        assert!(matches!(result, Err(SubmitError::UnableToSubmit)));
        assert_eq!(gateway.confirm_count(), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_card_fails_without_reporting() {
        let gateway = Arc::new(MockGateway::new());
        let errors = Arc::new(AtomicUsize::new(0));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .on_error(move |_: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let registry = mounted_registry();
        registry.set_value(FieldKind::Number, "4111111111111112");
        let service = CardFieldsService::new(gateway.clone(), registry, props);
        let result = service.submit(SubmitOptions::new("A21AAGdzcGVjaWFs")).await;

        match result {
            Err(SubmitError::InvalidCard { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, FieldKind::Number);
                assert_eq!(errors[0].code, CardError::InvalidNumber);
            }
            other => panic!("expected InvalidCard, got {other:?}"),
        }
        assert_eq!(gateway.confirm_count(), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_decline_marks_fields_and_resubmit_clears_them() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_next(declined_envelope());
        let errors = Arc::new(Mutex::new(Vec::new()));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .on_error(move |error: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.lock().unwrap().push(error);
                }
            })
            .build()
            .unwrap();

        let registry = mounted_registry();
        let service = CardFieldsService::new(gateway.clone(), registry.clone(), props);

        let result = service.submit(SubmitOptions::new("A21AAGdzcGVjaWFs")).await;
        assert!(matches!(result, Err(SubmitError::Gateway(_))));
        assert_eq!(
            registry.field_api_errors(FieldKind::Cvv),
            vec![ApiErrorCode::InvalidSecurityCode]
        );
        assert_eq!(errors.lock().unwrap().len(), 1);

        // Fixing the code and resubmitting starts from a clean form
        registry.set_value(FieldKind::Cvv, "456");
        service
            .submit(SubmitOptions::new("A21AAGdzcGVjaWFs"))
            .await
            .unwrap();
        assert!(registry.field_api_errors(FieldKind::Cvv).is_empty());
        assert_eq!(gateway.confirm_count(), 2);
    }

    #[tokio::test]
    async fn test_refused_transaction_lands_on_the_form() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_next(GatewayError::Api {
            status: 422,
            name: "TRANSACTION_REFUSED".to_string(),
            message: "The request was refused".to_string(),
            details: vec![],
        });

        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .build()
            .unwrap();

        let registry = mounted_registry();
        let service = CardFieldsService::new(gateway.clone(), registry.clone(), props);
        let result = service.submit(SubmitOptions::new("A21AAGdzcGVjaWFs")).await;

        assert!(matches!(result, Err(SubmitError::Gateway(_))));
        assert_eq!(
            registry.form_api_errors(),
            vec![ApiErrorCode::TransactionRejected]
        );
    }

    #[tokio::test]
    async fn test_on_approve_failure_is_a_flow_failure() {
        let gateway = Arc::new(MockGateway::new());
        let errors = Arc::new(AtomicUsize::new(0));

        let errors_tap = errors.clone();
        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .on_approve(|_: Approval| async { Err::<(), _>(CallbackError::new("receipt upload failed")) })
            .on_error(move |_: SubmitError| {
                let errors = errors_tap.clone();
                async move {
                    errors.fetch_add(1, Ordering::SeqCst);
                }
            })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let err = service
            .submit(SubmitOptions::new("A21AAGdzcGVjaWFs"))
            .await
            .unwrap_err();

        // The order was confirmed; the failure came from the integrator
        assert_eq!(gateway.confirm_count(), 1);
        assert_eq!(err.to_string(), "receipt upload failed");
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extra_billing_address_reaches_the_gateway() {
        let gateway = Arc::new(MockGateway::new());

        let props = CardProps::builder("client-1")
            .create_order(|| async { Ok::<_, CallbackError>("5O190127TN364715T".to_string()) })
            .build()
            .unwrap();

        let service = CardFieldsService::new(gateway.clone(), mounted_registry(), props);
        let mut options = SubmitOptions::new("A21AAGdzcGVjaWFs");
        options.extra_fields = Some(
            serde_json::from_value(serde_json::json!({
                "billing_address": { "postal_code": "10001", "country_code": "US" }
            }))
            .unwrap(),
        );
        service.submit(options).await.unwrap();

        let (_, payment_source, _) = gateway.last_confirm();
        let address = payment_source.card.billing_address.unwrap();
        assert_eq!(address.postal_code.as_deref(), Some("10001"));
        assert_eq!(address.country_code.as_deref(), Some("US"));
    }
}

//! Appointment Completion Workflow
//!
//! Runs the side effects of marking an appointment completed: resolving
//! the client record, debiting package sessions, awarding a loyalty stamp
//! and posting service revenue to the ledger.
//!
//! Steps run sequentially with independent writes. A persistence failure
//! is recorded in the outcome and aborts the remaining steps; earlier
//! writes stay in place and nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{
    Appointment, Client, ClientRepository, FinancialTransaction, PackageInstance,
    PackageInstanceStatus, ServiceRepository, TransactionKind, TransactionRepository,
};
use crate::domain::value_objects::CalendarDate;
use crate::infrastructure::metrics;

/// Ledger category for completion revenue.
pub const REVENUE_CATEGORY: &str = "services";

/// Completion workflow entry point.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Apply all completion side effects for `appointment`.
    async fn complete(&self, appointment: &Appointment) -> CompletionOutcome;
}

/// How the booking name resolved to a client record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum ClientResolution {
    /// Exact case-insensitive name match
    Matched { client_id: Uuid },
    /// No client record carries this name; loyalty steps are skipped
    Unmatched,
}

/// One session debited from a package instance.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PackageDebit {
    pub service_id: Uuid,
    pub instance_id: Uuid,
    pub package_name: String,
    /// Whether this debit exhausted the instance
    pub instance_used_up: bool,
}

/// Result of the loyalty stamp step.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum StampOutcome {
    /// Stamp added; `stamps_earned` is the new total
    Awarded { stamps_earned: i32 },
    /// Card already holds the maximum number of stamps
    CardFull,
    /// At least one package debit covered the visit
    SkippedDebited,
    /// No client record to stamp
    SkippedNoClient,
    /// The stamp write itself failed; detail in `step_failures`
    Failed,
    /// An earlier step failed before this one ran
    NotAttempted,
}

/// Result of the revenue step.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum RevenueOutcome {
    /// Income entry appended to the ledger
    Posted {
        transaction_id: Uuid,
        amount: String,
    },
    /// Appointment total was zero; nothing to post
    SkippedZeroAmount,
    /// An earlier step failed before this one ran
    NotAttempted,
}

/// Workflow step names, used in failure reports and metrics labels.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStep {
    ResolveClient,
    PackageDebit,
    LoyaltyStamp,
    Revenue,
}

impl CompletionStep {
    fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveClient => "resolve_client",
            Self::PackageDebit => "debit",
            Self::LoyaltyStamp => "stamp",
            Self::Revenue => "revenue",
        }
    }
}

/// A step that failed to persist. Earlier writes remain in place.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepFailure {
    pub step: CompletionStep,
    pub detail: String,
}

/// Full result of one completion run.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub appointment_id: Uuid,
    pub client: ClientResolution,
    pub debits: Vec<PackageDebit>,
    pub stamp: StampOutcome,
    pub revenue: RevenueOutcome,
    pub step_failures: Vec<StepFailure>,
}

impl CompletionOutcome {
    pub fn is_clean(&self) -> bool {
        self.step_failures.is_empty()
    }
}

/// Completion service implementation.
pub struct CompletionServiceImpl<C, S, T>
where
    C: ClientRepository,
    S: ServiceRepository,
    T: TransactionRepository,
{
    client_repo: Arc<C>,
    service_repo: Arc<S>,
    transaction_repo: Arc<T>,
}

impl<C, S, T> CompletionServiceImpl<C, S, T>
where
    C: ClientRepository,
    S: ServiceRepository,
    T: TransactionRepository,
{
    pub fn new(client_repo: Arc<C>, service_repo: Arc<S>, transaction_repo: Arc<T>) -> Self {
        Self {
            client_repo,
            service_repo,
            transaction_repo,
        }
    }

    /// Debit one session per booked service, each independently, from the
    /// first covering instance (oldest purchase first).
    async fn debit_packages(
        &self,
        appointment: &Appointment,
        client: &Client,
        today: CalendarDate,
        failures: &mut Vec<StepFailure>,
    ) -> Vec<PackageDebit> {
        let mut debits = Vec::new();

        let mut instances: Vec<PackageInstance> =
            match self.client_repo.find_package_instances(client.id).await {
                Ok(instances) => instances,
                Err(e) => {
                    metrics::record_completion_step(CompletionStep::PackageDebit.as_str(), "failed");
                    failures.push(StepFailure {
                        step: CompletionStep::PackageDebit,
                        detail: format!("Failed to load package instances: {}", e),
                    });
                    return debits;
                }
            };
        instances.sort_by_key(|i| i.purchase_date);

        for &service_id in &appointment.service_ids {
            let Some(instance) = instances
                .iter_mut()
                .find(|i| i.covers(service_id, today))
            else {
                metrics::record_completion_step(CompletionStep::PackageDebit.as_str(), "skipped");
                continue;
            };

            match self
                .client_repo
                .debit_instance_service(instance.id, service_id)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    // counter raced to zero between read and write
                    metrics::record_completion_step(
                        CompletionStep::PackageDebit.as_str(),
                        "skipped",
                    );
                    continue;
                }
                Err(e) => {
                    metrics::record_completion_step(CompletionStep::PackageDebit.as_str(), "failed");
                    failures.push(StepFailure {
                        step: CompletionStep::PackageDebit,
                        detail: format!("Failed to debit service {}: {}", service_id, e),
                    });
                    return debits;
                }
            }

            if let Some(entry) = instance
                .services
                .iter_mut()
                .find(|s| s.service_id == service_id)
            {
                entry.remaining_quantity -= 1;
            }

            let used_up = instance.is_fully_used();
            if used_up {
                if let Err(e) = self
                    .client_repo
                    .update_instance_status(instance.id, PackageInstanceStatus::Used)
                    .await
                {
                    metrics::record_completion_step(CompletionStep::PackageDebit.as_str(), "failed");
                    debits.push(PackageDebit {
                        service_id,
                        instance_id: instance.id,
                        package_name: instance.package_name.clone(),
                        instance_used_up: false,
                    });
                    failures.push(StepFailure {
                        step: CompletionStep::PackageDebit,
                        detail: format!("Failed to mark instance {} used: {}", instance.id, e),
                    });
                    return debits;
                }
                instance.status = PackageInstanceStatus::Used;
            }

            metrics::record_completion_step(CompletionStep::PackageDebit.as_str(), "ok");
            debits.push(PackageDebit {
                service_id,
                instance_id: instance.id,
                package_name: instance.package_name.clone(),
                instance_used_up: used_up,
            });
        }

        debits
    }

    async fn award_stamp(
        &self,
        client: &Client,
        failures: &mut Vec<StepFailure>,
    ) -> StampOutcome {
        if !client.card_has_room() {
            metrics::record_completion_step(CompletionStep::LoyaltyStamp.as_str(), "skipped");
            return StampOutcome::CardFull;
        }

        match self.client_repo.increment_stamps(client.id).await {
            Ok(()) => {
                metrics::record_completion_step(CompletionStep::LoyaltyStamp.as_str(), "ok");
                StampOutcome::Awarded {
                    stamps_earned: client.stamps_earned + 1,
                }
            }
            Err(e) => {
                metrics::record_completion_step(CompletionStep::LoyaltyStamp.as_str(), "failed");
                failures.push(StepFailure {
                    step: CompletionStep::LoyaltyStamp,
                    detail: format!("Failed to add stamp: {}", e),
                });
                StampOutcome::Failed
            }
        }
    }

    async fn post_revenue(
        &self,
        appointment: &Appointment,
        failures: &mut Vec<StepFailure>,
    ) -> RevenueOutcome {
        if !appointment.total_amount.is_positive() {
            metrics::record_completion_step(CompletionStep::Revenue.as_str(), "skipped");
            return RevenueOutcome::SkippedZeroAmount;
        }

        let service_names = match self
            .service_repo
            .find_by_ids(&appointment.service_ids)
            .await
        {
            Ok(services) => services
                .into_iter()
                .map(|s| s.name)
                .collect::<Vec<_>>()
                .join(", "),
            Err(e) => {
                metrics::record_completion_step(CompletionStep::Revenue.as_str(), "failed");
                failures.push(StepFailure {
                    step: CompletionStep::Revenue,
                    detail: format!("Failed to resolve service names: {}", e),
                });
                return RevenueOutcome::NotAttempted;
            }
        };

        let transaction = FinancialTransaction {
            id: Uuid::new_v4(),
            description: format!(
                "Service revenue: {} - {}",
                appointment.client_name.trim(),
                service_names
            ),
            amount: appointment.total_amount,
            date: appointment.date,
            category: REVENUE_CATEGORY.into(),
            kind: TransactionKind::Income,
            created_at: chrono::Utc::now(),
        };

        match self.transaction_repo.create(&transaction).await {
            Ok(created) => {
                metrics::record_completion_step(CompletionStep::Revenue.as_str(), "ok");
                RevenueOutcome::Posted {
                    transaction_id: created.id,
                    amount: created.amount.to_string(),
                }
            }
            Err(e) => {
                metrics::record_completion_step(CompletionStep::Revenue.as_str(), "failed");
                failures.push(StepFailure {
                    step: CompletionStep::Revenue,
                    detail: format!("Failed to post revenue: {}", e),
                });
                RevenueOutcome::NotAttempted
            }
        }
    }
}

#[async_trait]
impl<C, S, T> CompletionService for CompletionServiceImpl<C, S, T>
where
    C: ClientRepository + 'static,
    S: ServiceRepository + 'static,
    T: TransactionRepository + 'static,
{
    async fn complete(&self, appointment: &Appointment) -> CompletionOutcome {
        let mut failures = Vec::new();
        let today = CalendarDate::today();

        // 1. Resolve the client record by normalized name.
        let client = match self
            .client_repo
            .find_by_normalized_name(&appointment.normalized_client_name())
            .await
        {
            Ok(client) => client,
            Err(e) => {
                metrics::record_completion_step(CompletionStep::ResolveClient.as_str(), "failed");
                failures.push(StepFailure {
                    step: CompletionStep::ResolveClient,
                    detail: format!("Failed to look up client: {}", e),
                });
                return CompletionOutcome {
                    appointment_id: appointment.id,
                    client: ClientResolution::Unmatched,
                    debits: Vec::new(),
                    stamp: StampOutcome::NotAttempted,
                    revenue: RevenueOutcome::NotAttempted,
                    step_failures: failures,
                };
            }
        };

        let (resolution, debits, stamp) = match client {
            Some(client) => {
                tracing::debug!(client_id = %client.id, "Resolved completion client");

                // 2. Independent per-service package debits.
                let debits = self
                    .debit_packages(appointment, &client, today, &mut failures)
                    .await;
                if !failures.is_empty() {
                    return CompletionOutcome {
                        appointment_id: appointment.id,
                        client: ClientResolution::Matched {
                            client_id: client.id,
                        },
                        debits,
                        stamp: StampOutcome::NotAttempted,
                        revenue: RevenueOutcome::NotAttempted,
                        step_failures: failures,
                    };
                }

                // 3. Loyalty stamp, only for visits not covered by a package.
                let stamp = if debits.is_empty() {
                    self.award_stamp(&client, &mut failures).await
                } else {
                    metrics::record_completion_step(
                        CompletionStep::LoyaltyStamp.as_str(),
                        "skipped",
                    );
                    StampOutcome::SkippedDebited
                };
                if !failures.is_empty() {
                    return CompletionOutcome {
                        appointment_id: appointment.id,
                        client: ClientResolution::Matched {
                            client_id: client.id,
                        },
                        debits,
                        stamp,
                        revenue: RevenueOutcome::NotAttempted,
                        step_failures: failures,
                    };
                }

                (
                    ClientResolution::Matched {
                        client_id: client.id,
                    },
                    debits,
                    stamp,
                )
            }
            None => {
                tracing::warn!(
                    client_name = %appointment.client_name,
                    "No client record matches booking name; skipping loyalty steps"
                );
                (
                    ClientResolution::Unmatched,
                    Vec::new(),
                    StampOutcome::SkippedNoClient,
                )
            }
        };

        // 4. Revenue posting runs even when the client is unknown.
        let revenue = self.post_revenue(appointment, &mut failures).await;

        CompletionOutcome {
            appointment_id: appointment.id,
            client: resolution,
            debits,
            stamp,
            revenue,
            step_failures: failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::appointment::AppointmentStatus;
    use crate::domain::entities::client::MockClientRepository;
    use crate::domain::entities::financial_transaction::MockTransactionRepository;
    use crate::domain::entities::salon_service::MockServiceRepository;
    use crate::domain::entities::{InstanceService, SalonService};
    use crate::shared::error::AppError;
    use chrono::Utc;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn appointment(client_name: &str, services: Vec<Uuid>, amount: &str) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_name: client_name.into(),
            service_ids: services,
            professional_id: Uuid::new_v4(),
            date: "2026-05-20".parse().unwrap(),
            start_time: "10:00".parse().unwrap(),
            end_time: "11:00".parse().unwrap(),
            status: AppointmentStatus::Completed,
            total_amount: amount.parse().unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn client(name: &str, stamps: i32) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            phone: None,
            stamps_earned: stamps,
            mimos_redeemed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn instance(client_id: Uuid, service_id: Uuid, remaining: i32) -> PackageInstance {
        PackageInstance {
            id: Uuid::new_v4(),
            client_id,
            package_name: "Pacote Ouro".into(),
            status: PackageInstanceStatus::Active,
            purchase_date: "2026-01-01".parse().unwrap(),
            expiry_date: None,
            services: vec![InstanceService {
                service_id,
                remaining_quantity: remaining,
            }],
        }
    }

    fn catalog_service(id: Uuid, name: &str) -> SalonService {
        let now = Utc::now();
        SalonService {
            id,
            name: name.into(),
            price: "80,00".parse().unwrap(),
            duration_minutes: 60,
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        clients: MockClientRepository,
        services: MockServiceRepository,
        transactions: MockTransactionRepository,
    ) -> CompletionServiceImpl<MockClientRepository, MockServiceRepository, MockTransactionRepository>
    {
        CompletionServiceImpl::new(Arc::new(clients), Arc::new(services), Arc::new(transactions))
    }

    #[tokio::test]
    async fn test_unknown_client_skips_loyalty_but_posts_revenue() {
        let service_id = Uuid::new_v4();
        let appointment = appointment("Desconhecida", vec![service_id], "150,00");

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .withf(|name| name == "desconhecida")
            .returning(|_| Ok(None));
        clients.expect_find_package_instances().times(0);
        clients.expect_increment_stamps().times(0);

        let mut services = MockServiceRepository::new();
        services
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![catalog_service(service_id, "Corte")]));

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().times(1).returning(|t| Ok(t.clone()));

        let outcome = service(clients, services, transactions)
            .complete(&appointment)
            .await;

        assert_eq!(outcome.client, ClientResolution::Unmatched);
        assert!(outcome.debits.is_empty());
        assert_eq!(outcome.stamp, StampOutcome::SkippedNoClient);
        assert!(matches!(outcome.revenue, RevenueOutcome::Posted { .. }));
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_name_match_is_trimmed_and_case_insensitive() {
        let appointment = appointment("  MARIA Silva ", vec![], "0,00");
        let matched = client("Maria Silva", 0);
        let client_id = matched.id;

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .withf(|name| name == "maria silva")
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(|_| Ok(vec![]));
        clients.expect_increment_stamps().times(1).returning(|_| Ok(()));

        let outcome = service(
            clients,
            MockServiceRepository::new(),
            MockTransactionRepository::new(),
        )
        .complete(&appointment)
        .await;

        assert_eq!(outcome.client, ClientResolution::Matched { client_id });
        assert_eq!(outcome.stamp, StampOutcome::Awarded { stamps_earned: 1 });
        assert_eq!(outcome.revenue, RevenueOutcome::SkippedZeroAmount);
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_each_service_debits_independently() {
        let covered_a = Uuid::new_v4();
        let covered_b = Uuid::new_v4();
        let uncovered = Uuid::new_v4();
        let appointment = appointment("Ana", vec![covered_a, uncovered, covered_b], "0");

        let matched = client("Ana", 0);
        let client_id = matched.id;
        let mut inst_a = instance(client_id, covered_a, 2);
        inst_a.services.push(InstanceService {
            service_id: covered_b,
            remaining_quantity: 1,
        });
        let inst_a_id = inst_a.id;

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(move |_| Ok(vec![inst_a.clone()]));
        clients
            .expect_debit_instance_service()
            .with(eq(inst_a_id), eq(covered_a))
            .times(1)
            .returning(|_, _| Ok(true));
        clients
            .expect_debit_instance_service()
            .with(eq(inst_a_id), eq(covered_b))
            .times(1)
            .returning(|_, _| Ok(true));
        // two debits happened, so no stamp
        clients.expect_increment_stamps().times(0);

        let outcome = service(
            clients,
            MockServiceRepository::new(),
            MockTransactionRepository::new(),
        )
        .complete(&appointment)
        .await;

        assert_eq!(outcome.debits.len(), 2);
        assert_eq!(outcome.stamp, StampOutcome::SkippedDebited);
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_last_debit_marks_instance_used() {
        let service_id = Uuid::new_v4();
        let appointment = appointment("Ana", vec![service_id], "0");
        let matched = client("Ana", 0);
        let inst = instance(matched.id, service_id, 1);
        let inst_id = inst.id;

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(move |_| Ok(vec![inst.clone()]));
        clients
            .expect_debit_instance_service()
            .returning(|_, _| Ok(true));
        clients
            .expect_update_instance_status()
            .with(eq(inst_id), eq(PackageInstanceStatus::Used))
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = service(
            clients,
            MockServiceRepository::new(),
            MockTransactionRepository::new(),
        )
        .complete(&appointment)
        .await;

        assert_eq!(outcome.debits.len(), 1);
        assert!(outcome.debits[0].instance_used_up);
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_expired_instance_is_not_debited() {
        let service_id = Uuid::new_v4();
        let appointment = appointment("Ana", vec![service_id], "0");
        let matched = client("Ana", 5);
        let mut inst = instance(matched.id, service_id, 3);
        inst.expiry_date = Some("2020-01-01".parse().unwrap());

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(move |_| Ok(vec![inst.clone()]));
        clients.expect_debit_instance_service().times(0);
        // no debit, so a stamp is awarded instead
        clients.expect_increment_stamps().times(1).returning(|_| Ok(()));

        let outcome = service(
            clients,
            MockServiceRepository::new(),
            MockTransactionRepository::new(),
        )
        .complete(&appointment)
        .await;

        assert!(outcome.debits.is_empty());
        assert_eq!(outcome.stamp, StampOutcome::Awarded { stamps_earned: 6 });
    }

    #[tokio::test]
    async fn test_full_card_is_not_stamped() {
        let appointment = appointment("Ana", vec![], "0");
        let matched = client("Ana", 12);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(|_| Ok(vec![]));
        clients.expect_increment_stamps().times(0);

        let outcome = service(
            clients,
            MockServiceRepository::new(),
            MockTransactionRepository::new(),
        )
        .complete(&appointment)
        .await;

        assert_eq!(outcome.stamp, StampOutcome::CardFull);
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_revenue_description_names_client_and_services() {
        let service_id = Uuid::new_v4();
        let appointment = appointment(" Beatriz ", vec![service_id], "R$ 120,00");
        let matched = client("Beatriz", 0);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(|_| Ok(vec![]));
        clients.expect_increment_stamps().returning(|_| Ok(()));

        let mut services = MockServiceRepository::new();
        services
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![catalog_service(service_id, "Escova")]));

        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_create()
            .withf(|t| {
                t.description == "Service revenue: Beatriz - Escova"
                    && t.category == REVENUE_CATEGORY
                    && t.kind == TransactionKind::Income
                    && t.amount.to_string() == "120.00"
            })
            .times(1)
            .returning(|t| Ok(t.clone()));

        let outcome = service(clients, services, transactions)
            .complete(&appointment)
            .await;

        assert!(matches!(outcome.revenue, RevenueOutcome::Posted { .. }));
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_zero_amount_posts_nothing() {
        let appointment = appointment("Ana", vec![], "0,00");
        let matched = client("Ana", 0);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(|_| Ok(vec![]));
        clients.expect_increment_stamps().returning(|_| Ok(()));

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().times(0);

        let outcome = service(clients, MockServiceRepository::new(), transactions)
            .complete(&appointment)
            .await;

        assert_eq!(outcome.revenue, RevenueOutcome::SkippedZeroAmount);
    }

    #[tokio::test]
    async fn test_debit_failure_aborts_remaining_steps() {
        let service_id = Uuid::new_v4();
        let appointment = appointment("Ana", vec![service_id], "100,00");
        let matched = client("Ana", 0);
        let inst = instance(matched.id, service_id, 2);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(move |_| Ok(vec![inst.clone()]));
        clients
            .expect_debit_instance_service()
            .returning(|_, _| Err(AppError::Internal("connection reset".into())));
        clients.expect_increment_stamps().times(0);

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().times(0);

        let outcome = service(clients, MockServiceRepository::new(), transactions)
            .complete(&appointment)
            .await;

        assert_eq!(outcome.step_failures.len(), 1);
        assert_eq!(outcome.step_failures[0].step, CompletionStep::PackageDebit);
        assert_eq!(outcome.stamp, StampOutcome::NotAttempted);
        assert_eq!(outcome.revenue, RevenueOutcome::NotAttempted);
    }

    #[tokio::test]
    async fn test_stamp_failure_leaves_debits_and_aborts_revenue() {
        let appointment = appointment("Ana", vec![], "100,00");
        let matched = client("Ana", 0);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(|_| Ok(vec![]));
        clients
            .expect_increment_stamps()
            .returning(|_| Err(AppError::Internal("write timeout".into())));

        let mut transactions = MockTransactionRepository::new();
        transactions.expect_create().times(0);

        let outcome = service(clients, MockServiceRepository::new(), transactions)
            .complete(&appointment)
            .await;

        assert_eq!(outcome.step_failures.len(), 1);
        assert_eq!(outcome.step_failures[0].step, CompletionStep::LoyaltyStamp);
        assert_eq!(outcome.stamp, StampOutcome::Failed);
        assert_eq!(outcome.revenue, RevenueOutcome::NotAttempted);
    }

    #[tokio::test]
    async fn test_revenue_failure_is_recorded_not_raised() {
        let service_id = Uuid::new_v4();
        let appointment = appointment("Ana", vec![service_id], "100,00");
        let matched = client("Ana", 0);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        clients
            .expect_find_package_instances()
            .returning(|_| Ok(vec![]));
        clients.expect_increment_stamps().returning(|_| Ok(()));

        let mut services = MockServiceRepository::new();
        services
            .expect_find_by_ids()
            .returning(move |_| Ok(vec![catalog_service(service_id, "Corte")]));

        let mut transactions = MockTransactionRepository::new();
        transactions
            .expect_create()
            .returning(|_| Err(AppError::Internal("insert failed".into())));

        let outcome = service(clients, services, transactions)
            .complete(&appointment)
            .await;

        // the stamp stays awarded even though revenue failed
        assert_eq!(outcome.stamp, StampOutcome::Awarded { stamps_earned: 1 });
        assert_eq!(outcome.revenue, RevenueOutcome::NotAttempted);
        assert_eq!(outcome.step_failures.len(), 1);
        assert_eq!(outcome.step_failures[0].step, CompletionStep::Revenue);
    }

    #[tokio::test]
    async fn test_oldest_instance_is_debited_first() {
        let service_id = Uuid::new_v4();
        let appointment = appointment("Ana", vec![service_id], "0");
        let matched = client("Ana", 0);

        let mut older = instance(matched.id, service_id, 1);
        older.purchase_date = "2025-06-01".parse().unwrap();
        let older_id = older.id;
        let newer = instance(matched.id, service_id, 5);

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(matched.clone())));
        let instances = vec![newer.clone(), older.clone()];
        clients
            .expect_find_package_instances()
            .returning(move |_| Ok(instances.clone()));
        clients
            .expect_debit_instance_service()
            .with(eq(older_id), eq(service_id))
            .times(1)
            .returning(|_, _| Ok(true));
        clients
            .expect_update_instance_status()
            .returning(|_, _| Ok(()));

        let outcome = service(
            clients,
            MockServiceRepository::new(),
            MockTransactionRepository::new(),
        )
        .complete(&appointment)
        .await;

        assert_eq!(outcome.debits[0].instance_id, older_id);
    }
}

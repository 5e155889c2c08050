//! Instruction engine: evaluates comment instructions against their rules.
//!
//! Each instruction runs through three gates in order, stopping at the first
//! failure:
//!
//! 1. **Permission**: the actor satisfies any configured permission token.
//! 2. **State**: required labels (and required assignees) are present.
//! 3. **Capacity**: the actor holds fewer open issues with the added labels
//!    than the configured limit.
//!
//! A passing instruction edits the issue first and posts success feedback
//! afterwards, so the feedback always describes the post-mutation state.

use std::sync::Arc;

use tracing::Instrument;

use super::feedback::FeedbackContext;
use super::instruction_parser::parse_instructions;
use super::membership::MembershipCache;
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Action, ActorToken, EventContext, Flow, Gate, IssueSnapshot, MutationPlan, Permission,
    RuleBook, Verdict,
};
use crate::domain::ports::IssueTracker;

/// Result of running one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionOutcome {
    Applied {
        plan: MutationPlan,
        /// Issue as stored after the edit.
        issue: IssueSnapshot,
        feedback_posted: bool,
    },
    Rejected {
        gate: Gate,
        feedback_posted: bool,
    },
}

/// Tally of one comment's instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentReport {
    pub applied: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Instructions with no configured rule.
    pub unknown: usize,
}

pub struct InstructionEngine {
    rules: Arc<RuleBook>,
    tracker: Arc<dyn IssueTracker>,
    membership: Arc<MembershipCache>,
}

impl InstructionEngine {
    pub fn new(
        rules: Arc<RuleBook>,
        tracker: Arc<dyn IssueTracker>,
        membership: Arc<MembershipCache>,
    ) -> Self {
        Self {
            rules,
            tracker,
            membership,
        }
    }

    /// Evaluate every instruction in a comment body.
    ///
    /// Instructions are independent: a rejection or failure of one never
    /// stops the next. Later instructions see the issue as left by earlier ones.
    pub async fn handle_comment(&self, ctx: &EventContext, body: &str) -> CommentReport {
        let span = tracing::info_span!(
            "comment",
            req_id = %ctx.request_id,
            issue = ctx.issue.number,
            actor = %ctx.actor
        );
        self.handle_comment_inner(ctx, body).instrument(span).await
    }

    async fn handle_comment_inner(&self, ctx: &EventContext, body: &str) -> CommentReport {
        let mut report = CommentReport::default();
        let mut issue = ctx.issue.clone();

        for instruction in parse_instructions(body) {
            let Some(flow) = self.rules.flow(&instruction.name) else {
                tracing::debug!(instruction = %instruction.name, "no rule for instruction");
                report.unknown += 1;
                continue;
            };

            let scoped = EventContext {
                issue: issue.clone(),
                ..ctx.with_mentions(instruction.mentions)
            };
            match self.run(flow, &scoped).await {
                Ok(InstructionOutcome::Applied { issue: updated, .. }) => {
                    report.applied += 1;
                    issue = updated;
                }
                Ok(InstructionOutcome::Rejected { .. }) => report.rejected += 1,
                Err(e) => {
                    tracing::error!(
                        instruction = %flow.instruct,
                        error = %e,
                        "instruction failed"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Run one flow against one event: gates, edit, then feedback.
    pub async fn run(&self, flow: &Flow, ctx: &EventContext) -> DomainResult<InstructionOutcome> {
        let verdict = self.check(flow, ctx).await?;
        if let Verdict::Rejected { gate, feedback } = verdict {
            tracing::info!(
                instruction = %flow.instruct,
                gate = gate.as_str(),
                "instruction rejected"
            );
            let feedback_posted = self.post_feedback(ctx.issue.number, feedback).await;
            return Ok(InstructionOutcome::Rejected {
                gate,
                feedback_posted,
            });
        }

        let plan = compute_mutation(&flow.action, ctx);
        let issue = self.tracker.edit_issue(plan.issue, &plan.to_edit()).await?;
        tracing::info!(
            instruction = %flow.instruct,
            labels = ?plan.labels,
            assignees = ?plan.assignees,
            state = plan.state.as_str(),
            "instruction applied"
        );

        let feedback = FeedbackContext {
            assignees: plan.assignees.clone(),
            ..feedback_context(flow, ctx)
        }
        .render_opt(flow.action.success_feedback.as_ref());
        let feedback_posted = self.post_feedback(plan.issue, feedback).await;

        Ok(InstructionOutcome::Applied {
            plan,
            issue,
            feedback_posted,
        })
    }

    /// Run the three gates without side effects.
    pub async fn check(&self, flow: &Flow, ctx: &EventContext) -> DomainResult<Verdict> {
        let conditions = &flow.conditions;
        let feedback = feedback_context(flow, ctx);

        if !self.permitted(&conditions.permissions, ctx).await {
            return Ok(Verdict::Rejected {
                gate: Gate::Permission,
                feedback: feedback.render_opt(conditions.permission_feedback.as_ref()),
            });
        }

        if !ctx.issue.has_labels(&conditions.labels) {
            return Ok(Verdict::Rejected {
                gate: Gate::State,
                feedback: feedback.render_opt(conditions.label_feedback.as_ref()),
            });
        }

        if !required_assignees_present(&conditions.assignees, ctx) {
            let text = conditions
                .assignee_feedback
                .as_ref()
                .or(conditions.label_feedback.as_ref());
            return Ok(Verdict::Rejected {
                gate: Gate::State,
                feedback: feedback.render_opt(text),
            });
        }

        let capacity = flow
            .action
            .capacity
            .as_ref()
            .filter(|_| !flow.action.add_labels.is_empty());
        if let Some(capacity) = capacity {
            let held = self
                .tracker
                .count_open_assigned(&ctx.actor, &flow.action.add_labels)
                .await?;
            if held >= capacity.limit as usize {
                tracing::debug!(held = held, limit = capacity.limit, "capacity exhausted");
                return Ok(Verdict::Rejected {
                    gate: Gate::Capacity,
                    feedback: feedback.render_opt(capacity.feedback.as_ref()),
                });
            }
        }

        Ok(Verdict::Passed)
    }

    async fn permitted(&self, permissions: &[Permission], ctx: &EventContext) -> bool {
        for permission in permissions {
            let ok = match permission {
                Permission::Anyone => true,
                Permission::Assignees => ctx.issue.is_assigned(&ctx.actor),
                Permission::Maintainer => self.membership.is_maintainer(&ctx.actor).await,
                Permission::Member => self.membership.is_member(&ctx.actor).await,
            };
            if ok {
                return true;
            }
        }
        // Tolerate a stale member set with one forced refresh.
        permissions.contains(&Permission::Member)
            && self.membership.is_member_fresh(&ctx.actor).await
    }

    async fn post_feedback(&self, issue: u64, feedback: Option<String>) -> bool {
        let Some(text) = feedback else {
            return false;
        };
        match self.tracker.post_comment(issue, &text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(issue = issue, error = %e, "failed to post feedback");
                false
            }
        }
    }
}

fn feedback_context(flow: &Flow, ctx: &EventContext) -> FeedbackContext {
    FeedbackContext {
        login: ctx.actor.clone(),
        count: flow.action.capacity.as_ref().map(|c| c.limit),
        reset_date: None,
        request_id: Some(ctx.request_id),
        assignees: ctx.issue.assignees.clone(),
    }
}

fn required_assignees_present(required: &[ActorToken], ctx: &EventContext) -> bool {
    required.iter().all(|token| match token {
        ActorToken::Commenter => ctx.issue.is_assigned(&ctx.actor),
        // A line without mentions has nobody to check.
        ActorToken::Mentioned => ctx.mentions.iter().all(|m| ctx.issue.is_assigned(m)),
        ActorToken::AllAssignees => !ctx.issue.assignees.is_empty(),
    })
}

/// Next labels: `(current - remove) ∪ add`, keeping the current order.
pub fn next_labels(current: &[String], remove: &[String], add: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = current
        .iter()
        .filter(|l| !remove.contains(l))
        .cloned()
        .collect();
    for label in add {
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    labels
}

/// Next assignees: apply each add token, then each remove token, in order.
pub fn next_assignees(
    current: &[String],
    add: &[ActorToken],
    remove: &[ActorToken],
    actor: &str,
    mentions: &[String],
) -> Vec<String> {
    let mut assignees: Vec<String> = current.to_vec();
    for token in add {
        match token {
            ActorToken::Commenter => push_unique(&mut assignees, actor),
            ActorToken::Mentioned => {
                for login in mentions {
                    push_unique(&mut assignees, login);
                }
            }
            // Rejected in add lists at load time.
            ActorToken::AllAssignees => {}
        }
    }
    for token in remove {
        match token {
            ActorToken::Commenter => assignees.retain(|a| !a.eq_ignore_ascii_case(actor)),
            ActorToken::Mentioned => {
                assignees.retain(|a| !mentions.iter().any(|m| m.eq_ignore_ascii_case(a)));
            }
            ActorToken::AllAssignees => assignees.clear(),
        }
    }
    assignees
}

fn push_unique(list: &mut Vec<String>, login: &str) {
    if !list.iter().any(|a| a.eq_ignore_ascii_case(login)) {
        list.push(login.to_string());
    }
}

/// Compute the mutation for a flow whose gates passed.
pub fn compute_mutation(action: &Action, ctx: &EventContext) -> MutationPlan {
    MutationPlan {
        issue: ctx.issue.number,
        labels: next_labels(&ctx.issue.labels, &action.remove_labels, &action.add_labels),
        assignees: next_assignees(
            &ctx.issue.assignees,
            &action.add_assignees,
            &action.remove_assignees,
            &ctx.actor,
            &ctx.mentions,
        ),
        state: action.state,
    }
}

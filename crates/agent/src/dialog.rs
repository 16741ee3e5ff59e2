//! Dialog state machine
//!
//! The orchestrator of the conversation: it consumes extractor output and
//! session context, applies per-state transition rules, mutates the
//! context, and produces the next utterance to speak. Booking mutations go
//! through the collaborator; the state advances only on confirmed success,
//! so a failed call leaves the session where the next "yes" retries it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use concierge_booking::BookingService;
use concierge_core::{pricing, Booking, SeatType, ServiceKind};

use crate::extract::{self, Extraction, Polarity};
use crate::session::{PendingService, SessionContext, SessionStore};
use crate::summary;
use crate::AgentError;

/// Dialog states (closed set). Exactly one is active per session and it is
/// the single source of truth for what input the agent expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    WaitingName,
    WaitingServiceChoice,
    WaitingPnr,
    ConfirmingFlight,
    SeatType,
    SeatConfirm,
    BaggageAmount,
    BaggageConfirm,
    PriorityConfirm,
    WheelchairName,
    WheelchairType,
    PetDetails,
    WhatsappConfirm,
    Transfer,
    Completed,
}

impl DialogState {
    /// Get state display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DialogState::WaitingName => "waiting for name",
            DialogState::WaitingServiceChoice => "waiting for service choice",
            DialogState::WaitingPnr => "waiting for PNR",
            DialogState::ConfirmingFlight => "confirming flight",
            DialogState::SeatType => "choosing seat type",
            DialogState::SeatConfirm => "confirming seat",
            DialogState::BaggageAmount => "collecting baggage weight",
            DialogState::BaggageConfirm => "confirming baggage",
            DialogState::PriorityConfirm => "confirming priority boarding",
            DialogState::WheelchairName => "collecting wheelchair passenger",
            DialogState::WheelchairType => "collecting assistance level",
            DialogState::PetDetails => "collecting pet details",
            DialogState::WhatsappConfirm => "offering WhatsApp summary",
            DialogState::Transfer => "transferred to specialist",
            DialogState::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogState::Transfer | DialogState::Completed)
    }
}

/// Result of one processed turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Utterance to speak back to the caller
    pub response: String,
    pub dialog_state: DialogState,
    /// Snapshot of the confirmed booking, when one is attached
    pub booking: Option<Booking>,
}

/// Greeting spoken when a session starts.
pub const GREETING: &str =
    "Welcome to Horizon Airways customer service! May I know who I'm speaking with, please?";

const SERVICE_MENU: &str =
    "seat selection, extra baggage, priority boarding, wheelchair assistance, or pet travel";

/// The authoritative turn processor. One instance serves all sessions;
/// per-session sequencing comes from the context lock inside each
/// [`crate::session::SessionHandle`].
pub struct DialogManager {
    store: Arc<SessionStore>,
    booking: Arc<dyn BookingService>,
}

impl DialogManager {
    pub fn new(store: Arc<SessionStore>, booking: Arc<dyn BookingService>) -> Self {
        Self { store, booking }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Start (or fresh-start reset) a session and return the greeting.
    /// The session always begins by waiting for the caller's name.
    pub fn start_session(&self, session_id: &str) -> String {
        self.store.create(session_id, true);
        tracing::info!(session_id, "conversation started");
        GREETING.to_string()
    }

    /// Process one caller utterance for a session.
    ///
    /// Fails only when the session does not exist (never started, or
    /// already evicted); every other problem is handled inside the dialog
    /// and turned into a spoken re-prompt.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        utterance: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(|| AgentError::SessionNotFound(session_id.to_string()))?;
        handle.touch();

        let mut ctx = handle.context.lock().await;
        let state_before = ctx.dialog_state;
        let extraction = extract::extract(utterance);

        let response = match state_before {
            DialogState::WaitingName => self.on_waiting_name(&mut ctx, utterance, &extraction),
            DialogState::WaitingServiceChoice => {
                self.on_service_choice(&mut ctx, utterance, &extraction).await
            }
            DialogState::WaitingPnr => self.on_waiting_pnr(&mut ctx, &extraction).await,
            DialogState::ConfirmingFlight => self.on_confirming_flight(&mut ctx, utterance).await,
            DialogState::SeatType => self.on_seat_type(&mut ctx, &extraction).await,
            DialogState::SeatConfirm => self.on_seat_confirm(&mut ctx, utterance).await,
            DialogState::BaggageAmount => self.on_baggage_amount(&mut ctx, &extraction),
            DialogState::BaggageConfirm => self.on_baggage_confirm(&mut ctx, utterance).await,
            DialogState::PriorityConfirm => self.on_priority_confirm(&mut ctx, utterance).await,
            DialogState::WheelchairName => {
                self.on_wheelchair_name(&mut ctx, utterance, &extraction)
            }
            DialogState::WheelchairType => self.on_wheelchair_type(&mut ctx, &extraction).await,
            DialogState::PetDetails => self.on_pet_details(&mut ctx, &extraction).await,
            DialogState::WhatsappConfirm => self.on_whatsapp_confirm(&mut ctx, utterance).await,
            DialogState::Transfer => {
                "You're being connected to our specialist team; they'll take it from here."
                    .to_string()
            }
            DialogState::Completed => {
                "This conversation is complete. Please start a new session if you need anything else."
                    .to_string()
            }
        };

        if ctx.dialog_state != state_before {
            tracing::debug!(
                session_id,
                from = state_before.display_name(),
                to = ctx.dialog_state.display_name(),
                "dialog transition"
            );
        }

        Ok(TurnOutcome {
            response,
            dialog_state: ctx.dialog_state,
            booking: ctx.booking.clone(),
        })
    }

    fn on_waiting_name(
        &self,
        ctx: &mut SessionContext,
        utterance: &str,
        extraction: &Extraction,
    ) -> String {
        let name = extraction.entities.person_name.clone().or_else(|| {
            // A bare one-or-two-word reply is taken as the name, but only
            // when nothing else matched that could explain the utterance.
            if extraction.intents.is_empty() && extract::classify_polarity(utterance).is_none() {
                extract::fallback_name(utterance)
            } else {
                None
            }
        });

        match name {
            Some(name) => {
                ctx.customer_name = Some(name.clone());
                ctx.dialog_state = DialogState::WaitingServiceChoice;
                format!(
                    "Nice to meet you, {name}! I can help with {SERVICE_MENU}. \
                     What can I do for you today?"
                )
            }
            None => {
                "Sorry, I didn't catch your name. Could you tell me who I'm speaking with?"
                    .to_string()
            }
        }
    }

    async fn on_service_choice(
        &self,
        ctx: &mut SessionContext,
        utterance: &str,
        extraction: &Extraction,
    ) -> String {
        let services = extraction.requested_services();
        for kind in &services {
            ctx.queue_service(*kind);
        }

        // Entities mentioned alongside the request are carried into their
        // sub-states so the caller is not asked twice.
        if ctx.requested_services.contains(&ServiceKind::Seat) {
            if let Some(seat_type) = extraction.entities.seat_type {
                ctx.noted_seat_type = Some(seat_type);
            }
        }
        if ctx.requested_services.contains(&ServiceKind::Baggage)
            && !ctx.requested_services.contains(&ServiceKind::Pet)
        {
            if let Some(kg) = extraction.entities.weight_kg {
                ctx.noted_baggage_kg = Some(kg);
            }
        }

        if let Some(pnr) = extraction.entities.pnr.clone() {
            return self.lookup_and_confirm(ctx, &pnr, &services).await;
        }

        if !services.is_empty() {
            ctx.dialog_state = DialogState::WaitingPnr;
            return format!(
                "Certainly, {} it is. May I have your 6-character booking reference, please?",
                list_services(&services)
            );
        }

        if extract::classify_polarity(utterance).is_some() {
            return format!("I can help with {SERVICE_MENU}. Which would you like?");
        }

        // Nothing we recognize: keep the raw request for the specialist
        // hand-off and re-list what the agent can do.
        ctx.unknown_requests.push(utterance.to_string());
        tracing::info!(session_id = %ctx.session_id, "unrecognized service request noted");
        format!(
            "I can't take care of that myself, but I've noted it for our specialist team. \
             I can help with {SERVICE_MENU}. Would you like any of those?"
        )
    }

    async fn on_waiting_pnr(&self, ctx: &mut SessionContext, extraction: &Extraction) -> String {
        match extraction.entities.pnr.clone() {
            Some(pnr) => self.lookup_and_confirm(ctx, &pnr, &[]).await,
            None => {
                "I need your 6-character booking reference, for example ABC123. \
                 Could you read it out?"
                    .to_string()
            }
        }
    }

    async fn lookup_and_confirm(
        &self,
        ctx: &mut SessionContext,
        pnr: &str,
        newly_requested: &[ServiceKind],
    ) -> String {
        match self.booking.lookup_booking(pnr).await {
            Ok(Some(booking)) => {
                ctx.pnr = Some(booking.pnr.clone());
                ctx.booking = Some(booking.clone());
                ctx.dialog_state = DialogState::ConfirmingFlight;

                let ack = if newly_requested.is_empty() {
                    String::new()
                } else {
                    format!("Certainly, {}. ", list_services(newly_requested))
                };
                format!(
                    "{ack}I found your booking {}: flight {} from {} on {}. \
                     Is that the flight you'd like to change?",
                    booking.pnr,
                    booking.flight_number,
                    booking.route(),
                    booking.date.format("%d %b %Y"),
                )
            }
            Ok(None) => {
                ctx.dialog_state = DialogState::WaitingPnr;
                format!(
                    "I couldn't find a booking under {pnr}. Could you double-check the \
                     reference and read it out again?"
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, pnr, "booking lookup failed");
                "I ran into a problem reaching the booking system. \
                 Could you give me that reference once more?"
                    .to_string()
            }
        }
    }

    async fn on_confirming_flight(&self, ctx: &mut SessionContext, utterance: &str) -> String {
        match extract::classify_polarity(utterance) {
            Some(Polarity::Affirmative) => self.start_next_service(ctx).await,
            Some(Polarity::Negative) => {
                // The customer disputes the flight: discard PNR and booking
                // but keep the requested services queued.
                ctx.clear_flight();
                ctx.dialog_state = DialogState::WaitingPnr;
                "My apologies, let's try that again. What is the correct booking reference?"
                    .to_string()
            }
            None => {
                let flight = ctx
                    .booking
                    .as_ref()
                    .map(|b| format!("flight {} on {}", b.flight_number, b.date.format("%d %b %Y")))
                    .unwrap_or_else(|| "that flight".to_string());
                format!(
                    "Just to confirm, is {flight} the booking you'd like to change? \
                     Please say yes or no."
                )
            }
        }
    }

    /// Dispatch to the sub-state owning the service at the cursor, or wrap
    /// up once the queue is exhausted.
    async fn start_next_service(&self, ctx: &mut SessionContext) -> String {
        let Some(kind) = ctx.current_service() else {
            return self.offer_wrap_up(ctx);
        };

        match kind {
            ServiceKind::Seat => {
                let seat_type = ctx.noted_seat_type.take();
                ctx.pending = PendingService::Seat {
                    seat_type,
                    offered: None,
                };
                match seat_type {
                    Some(seat_type) => self.offer_seat(ctx, seat_type).await,
                    None => {
                        ctx.dialog_state = DialogState::SeatType;
                        "Which seat would you prefer: window, aisle, or extra legroom?".to_string()
                    }
                }
            }
            ServiceKind::Baggage => match ctx.noted_baggage_kg.take() {
                Some(kg) => {
                    ctx.pending = PendingService::Baggage { kg: Some(kg) };
                    ctx.dialog_state = DialogState::BaggageConfirm;
                    quote_baggage(kg)
                }
                None => {
                    ctx.pending = PendingService::Baggage { kg: None };
                    ctx.dialog_state = DialogState::BaggageAmount;
                    "How many extra kilograms of baggage would you like to add?".to_string()
                }
            },
            ServiceKind::Priority => {
                ctx.dialog_state = DialogState::PriorityConfirm;
                "Priority boarding is complimentary on your fare. Shall I add it to the booking?"
                    .to_string()
            }
            ServiceKind::Wheelchair => {
                ctx.pending = PendingService::Wheelchair {
                    passenger: None,
                    level: None,
                };
                ctx.dialog_state = DialogState::WheelchairName;
                "Of course, wheelchair assistance is free of charge. \
                 Which passenger is it for?"
                    .to_string()
            }
            ServiceKind::Pet => {
                ctx.pending = PendingService::Pet {
                    breed: None,
                    weight_kg: None,
                };
                ctx.dialog_state = DialogState::PetDetails;
                "Pet travel is arranged by our specialist desk, but I can take the details now. \
                 What breed is your pet, and roughly how much does it weigh in kilograms?"
                    .to_string()
            }
        }
    }

    async fn offer_seat(&self, ctx: &mut SessionContext, seat_type: SeatType) -> String {
        let Some(flight) = ctx.booking.as_ref().map(|b| b.flight_number.clone()) else {
            ctx.dialog_state = DialogState::WaitingPnr;
            return "I seem to have lost your booking details. \
                    Could you give me the booking reference again?"
                .to_string();
        };

        match self.booking.find_available_seat(&flight, seat_type).await {
            Ok(Some(seat)) => {
                let price = pricing::seat_price(seat_type);
                ctx.pending = PendingService::Seat {
                    seat_type: Some(seat_type),
                    offered: Some(seat.clone()),
                };
                ctx.dialog_state = DialogState::SeatConfirm;
                format!(
                    "I can offer you seat {}, {}, for Rs.{price}. Shall I book it?",
                    seat.seat_id,
                    seat_description(seat_type),
                )
            }
            Ok(None) => {
                ctx.pending = PendingService::Seat {
                    seat_type: None,
                    offered: None,
                };
                ctx.dialog_state = DialogState::SeatType;
                format!(
                    "I'm afraid there are no {} seats left on this flight. \
                     Would a different type work: window, aisle, or extra legroom?",
                    seat_type.display_name()
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, flight, "seat lookup failed");
                ctx.pending = PendingService::Seat {
                    seat_type: None,
                    offered: None,
                };
                ctx.dialog_state = DialogState::SeatType;
                "I encountered an error while checking the seat map, let me try again. \
                 Which seat type would you like?"
                    .to_string()
            }
        }
    }

    async fn on_seat_type(&self, ctx: &mut SessionContext, extraction: &Extraction) -> String {
        match extraction.entities.seat_type {
            Some(seat_type) => self.offer_seat(ctx, seat_type).await,
            None => {
                "We have window, aisle, and extra legroom seats. Which would you like?".to_string()
            }
        }
    }

    async fn on_seat_confirm(&self, ctx: &mut SessionContext, utterance: &str) -> String {
        let (seat, seat_type) = match &ctx.pending {
            PendingService::Seat {
                seat_type: Some(seat_type),
                offered: Some(seat),
            } => (seat.clone(), *seat_type),
            _ => {
                ctx.dialog_state = DialogState::SeatType;
                return "Let's pick that seat again: window, aisle, or extra legroom?".to_string();
            }
        };

        match extract::classify_polarity(utterance) {
            Some(Polarity::Affirmative) => {
                let Some(pnr) = ctx.pnr.clone() else {
                    ctx.dialog_state = DialogState::WaitingPnr;
                    return "I seem to have lost your booking reference. \
                            Could you read it out again?"
                        .to_string();
                };
                let passenger = ctx.passenger_name();

                match self.booking.book_seat(&pnr, &passenger, &seat.seat_id).await {
                    Ok(()) => {
                        let price = pricing::seat_price(seat_type);
                        ctx.record_completed(
                            ServiceKind::Seat,
                            format!("{} seat {}", capitalize(seat_type.display_name()), seat.seat_id),
                            price,
                        );
                        ctx.advance_service();
                        let next = self.start_next_service(ctx).await;
                        format!("Done! Seat {} is yours. {next}", seat.seat_id)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, pnr, "seat booking failed");
                        format!(
                            "I encountered an error while booking the seat, let me try again. \
                             Shall I go ahead with seat {}?",
                            seat.seat_id
                        )
                    }
                }
            }
            Some(Polarity::Negative) => {
                ctx.pending = PendingService::Seat {
                    seat_type: None,
                    offered: None,
                };
                ctx.dialog_state = DialogState::SeatType;
                "No problem. Would you prefer a window, aisle, or extra legroom seat instead?"
                    .to_string()
            }
            None => format!(
                "Shall I book seat {} for you? Please say yes or no.",
                seat.seat_id
            ),
        }
    }

    fn on_baggage_amount(&self, ctx: &mut SessionContext, extraction: &Extraction) -> String {
        match extraction.entities.weight_kg {
            Some(kg) if kg > 0 => {
                ctx.pending = PendingService::Baggage { kg: Some(kg) };
                ctx.dialog_state = DialogState::BaggageConfirm;
                quote_baggage(kg)
            }
            _ => "How many kilograms of extra baggage should I add? For example, say 10 kg."
                .to_string(),
        }
    }

    async fn on_baggage_confirm(&self, ctx: &mut SessionContext, utterance: &str) -> String {
        let kg = match ctx.pending {
            PendingService::Baggage { kg: Some(kg) } => kg,
            _ => {
                ctx.dialog_state = DialogState::BaggageAmount;
                return "How many kilograms of extra baggage would you like?".to_string();
            }
        };

        match extract::classify_polarity(utterance) {
            Some(Polarity::Affirmative) => {
                let Some(pnr) = ctx.pnr.clone() else {
                    ctx.dialog_state = DialogState::WaitingPnr;
                    return "I seem to have lost your booking reference. \
                            Could you read it out again?"
                        .to_string();
                };

                match self.booking.add_baggage(&pnr, kg).await {
                    Ok(()) => {
                        ctx.record_completed(
                            ServiceKind::Baggage,
                            format!("{kg} kg extra baggage"),
                            pricing::baggage_price(kg),
                        );
                        ctx.advance_service();
                        let next = self.start_next_service(ctx).await;
                        format!("Added {kg} kg of extra baggage. {next}")
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, pnr, "baggage add failed");
                        "I encountered an error while adding the baggage, let me try again. \
                         Shall I add it?"
                            .to_string()
                    }
                }
            }
            Some(Polarity::Negative) => {
                ctx.advance_service();
                let next = self.start_next_service(ctx).await;
                format!("Alright, I won't add the extra baggage. {next}")
            }
            None => format!(
                "Shall I add {kg} kg of extra baggage for Rs.{}? Please say yes or no.",
                pricing::baggage_price(kg)
            ),
        }
    }

    async fn on_priority_confirm(&self, ctx: &mut SessionContext, utterance: &str) -> String {
        match extract::classify_polarity(utterance) {
            Some(Polarity::Affirmative) => {
                let Some(pnr) = ctx.pnr.clone() else {
                    ctx.dialog_state = DialogState::WaitingPnr;
                    return "I seem to have lost your booking reference. \
                            Could you read it out again?"
                        .to_string();
                };

                match self.booking.enable_priority(&pnr).await {
                    Ok(()) => {
                        ctx.record_completed(
                            ServiceKind::Priority,
                            "Priority boarding".to_string(),
                            0,
                        );
                        ctx.advance_service();
                        let next = self.start_next_service(ctx).await;
                        format!("Priority boarding is on, free of charge. {next}")
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, pnr, "priority enable failed");
                        "I encountered an error while enabling priority boarding, \
                         let me try again. Shall I add it?"
                            .to_string()
                    }
                }
            }
            Some(Polarity::Negative) => {
                ctx.advance_service();
                let next = self.start_next_service(ctx).await;
                format!("No problem, I'll leave priority boarding off. {next}")
            }
            None => "Shall I add complimentary priority boarding? Please say yes or no."
                .to_string(),
        }
    }

    fn on_wheelchair_name(
        &self,
        ctx: &mut SessionContext,
        utterance: &str,
        extraction: &Extraction,
    ) -> String {
        let lower = utterance.to_lowercase();

        // A passenger on the booking may be referenced by first name only.
        let from_booking = ctx.booking.as_ref().and_then(|b| {
            b.passengers
                .iter()
                .find(|p| {
                    p.split_whitespace()
                        .next()
                        .map(str::to_lowercase)
                        .is_some_and(|first| {
                            lower
                                .split_whitespace()
                                .any(|w| w.trim_matches(|c: char| !c.is_alphanumeric()) == first)
                        })
                })
                .cloned()
        });

        let self_reference = lower.contains("myself")
            || lower
                .split_whitespace()
                .any(|w| matches!(w.trim_matches(|c: char| !c.is_alphanumeric()), "me" | "i"));

        let name = extraction
            .entities
            .person_name
            .clone()
            .or(from_booking)
            .or_else(|| {
                if self_reference {
                    ctx.known_passenger()
                } else {
                    None
                }
            })
            .or_else(|| extract::fallback_name(utterance));

        match name {
            Some(name) => {
                ctx.pending = PendingService::Wheelchair {
                    passenger: Some(name.clone()),
                    level: None,
                };
                ctx.dialog_state = DialogState::WheelchairType;
                format!(
                    "Got it. What level of assistance does {name} need: gate to gate, \
                     check-in to boarding, or arrival assistance?"
                )
            }
            None => {
                "Could you tell me the name of the passenger who needs the wheelchair?"
                    .to_string()
            }
        }
    }

    async fn on_wheelchair_type(&self, ctx: &mut SessionContext, extraction: &Extraction) -> String {
        let passenger = match &ctx.pending {
            PendingService::Wheelchair {
                passenger: Some(passenger),
                ..
            } => passenger.clone(),
            _ => {
                ctx.dialog_state = DialogState::WheelchairName;
                return "Which passenger needs the wheelchair assistance?".to_string();
            }
        };
        let Some(pnr) = ctx.pnr.clone() else {
            ctx.dialog_state = DialogState::WaitingPnr;
            return "I seem to have lost your booking reference. Could you read it out again?"
                .to_string();
        };

        // Anything that does not name a known level gets full assistance.
        let level = extraction.entities.assistance.unwrap_or_default();

        match self
            .booking
            .register_wheelchair(&pnr, &passenger, level)
            .await
        {
            Ok(()) => {
                ctx.record_completed(
                    ServiceKind::Wheelchair,
                    format!(
                        "Wheelchair assistance ({}) for {passenger}",
                        level.display_name()
                    ),
                    0,
                );
                ctx.advance_service();
                let next = self.start_next_service(ctx).await;
                format!(
                    "Wheelchair assistance, {}, is arranged for {passenger}, free of charge. {next}",
                    level.display_name()
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, pnr, "wheelchair registration failed");
                "I encountered an error while registering the assistance, let me try again. \
                 What level of assistance is needed?"
                    .to_string()
            }
        }
    }

    async fn on_pet_details(&self, ctx: &mut SessionContext, extraction: &Extraction) -> String {
        let breed = extraction.entities.pet_breed.clone();
        let weight = extraction.entities.weight_kg;

        let described = match (&breed, weight) {
            (Some(breed), Some(weight)) => format!("your {breed} at {weight} kg"),
            (Some(breed), None) => format!("your {breed}"),
            (None, Some(weight)) => format!("your pet at {weight} kg"),
            (None, None) => {
                return "Could you tell me your pet's breed and its approximate weight \
                        in kilograms?"
                    .to_string();
            }
        };

        ctx.pending = PendingService::Pet {
            breed,
            weight_kg: weight,
        };
        // Pet bookings are never completed by the agent.
        ctx.transfer_required = true;
        ctx.advance_service();

        let next = self.start_next_service(ctx).await;
        format!(
            "Noted, {described}. Pet travel is completed by our specialist team, \
             so I'll pass these details along. {next}"
        )
    }

    fn offer_wrap_up(&self, ctx: &mut SessionContext) -> String {
        ctx.dialog_state = DialogState::WhatsappConfirm;
        let total = ctx.total_due();

        if ctx.transfer_pending() {
            if ctx.completed_services.is_empty() {
                "I'll connect you to our specialist team for the rest of your requests. \
                 Before I do, would you like a summary of this booking on WhatsApp?"
                    .to_string()
            } else {
                format!(
                    "That covers what I can do from here; your total comes to Rs.{total}. \
                     I'll also connect you to our specialist team for the remaining requests. \
                     Would you like the summary and payment link on WhatsApp first?"
                )
            }
        } else if ctx.completed_services.is_empty() {
            "I haven't added any services to this booking. \
             Would you like a summary on WhatsApp anyway?"
                .to_string()
        } else {
            format!(
                "That's everything! Your total comes to Rs.{total}. \
                 Would you like the summary and payment link on WhatsApp?"
            )
        }
    }

    async fn on_whatsapp_confirm(&self, ctx: &mut SessionContext, utterance: &str) -> String {
        match extract::classify_polarity(utterance) {
            Some(Polarity::Affirmative) => {
                let (Some(pnr), Some(booking)) = (ctx.pnr.clone(), ctx.booking.clone()) else {
                    return self.finish(ctx, false);
                };

                let text = summary::format_summary(
                    &booking,
                    &ctx.passenger_name(),
                    &ctx.completed_services,
                );
                match self.booking.send_summary(&pnr, &text).await {
                    Ok(()) => self.finish(ctx, true),
                    Err(err) => {
                        tracing::warn!(error = %err, pnr, "summary send failed");
                        "I couldn't send the WhatsApp message just now. Shall I try once more?"
                            .to_string()
                    }
                }
            }
            Some(Polarity::Negative) => self.finish(ctx, false),
            None => "Would you like the summary on WhatsApp? Please say yes or no.".to_string(),
        }
    }

    fn finish(&self, ctx: &mut SessionContext, summary_sent: bool) -> String {
        let sent = if summary_sent {
            "I've sent the summary to your WhatsApp. "
        } else {
            ""
        };

        if ctx.transfer_pending() {
            ctx.dialog_state = DialogState::Transfer;
            tracing::info!(session_id = %ctx.session_id, "transferring to specialist");
            format!(
                "{sent}I'm connecting you to our specialist team now; they'll take care of \
                 the rest. Thank you for flying Horizon Airways!"
            )
        } else {
            ctx.dialog_state = DialogState::Completed;
            format!(
                "{sent}You're all set. Thank you for flying Horizon Airways, have a great trip!"
            )
        }
    }
}

fn seat_description(seat_type: SeatType) -> &'static str {
    match seat_type {
        SeatType::Window => "a window seat",
        SeatType::Aisle => "an aisle seat",
        SeatType::ExtraLegroom => "an extra legroom seat",
    }
}

fn quote_baggage(kg: u32) -> String {
    format!(
        "{kg} kg of extra baggage comes to Rs.{}. Shall I add it?",
        pricing::baggage_price(kg)
    )
}

fn list_services(services: &[ServiceKind]) -> String {
    let names: Vec<&str> = services.iter().map(|s| s.display_name()).collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization_is_snake_case() {
        let json = serde_json::to_string(&DialogState::WhatsappConfirm).unwrap();
        assert_eq!(json, "\"whatsapp_confirm\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(DialogState::Transfer.is_terminal());
        assert!(DialogState::Completed.is_terminal());
        assert!(!DialogState::WaitingName.is_terminal());
    }

    #[test]
    fn test_list_services() {
        assert_eq!(list_services(&[ServiceKind::Seat]), "seat selection");
        assert_eq!(
            list_services(&[ServiceKind::Seat, ServiceKind::Baggage]),
            "seat selection and extra baggage"
        );
        assert_eq!(
            list_services(&[
                ServiceKind::Seat,
                ServiceKind::Baggage,
                ServiceKind::Priority
            ]),
            "seat selection, extra baggage and priority boarding"
        );
    }
}

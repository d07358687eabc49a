use super::*;

impl ModerationWorld {
    pub(super) fn process_due_commands(&mut self, tick: u64) {
        self.queued_commands.sort_by(|a, b| {
            a.effective_tick
                .cmp(&b.effective_tick)
                .then(a.insertion_sequence.cmp(&b.insertion_sequence))
        });

        let mut future = Vec::new();
        let mut due = Vec::new();
        for queued in self.queued_commands.drain(..) {
            if queued.effective_tick <= tick {
                due.push(queued);
            } else {
                future.push(queued);
            }
        }
        self.queued_commands = future;
        self.sync_queue_depth();

        for queued in due {
            self.apply_command(queued.command);
        }
    }

    pub(super) fn apply_command(&mut self, command: Command) {
        let command_ref = format!("cmd:{}", command.command_id);
        let command_type = command.command_type;
        match command.payload {
            CommandPayload::SessionStart => self.start(),
            CommandPayload::SessionReset => self.reset(),
            CommandPayload::SelectPost { post_id } => {
                if self.status.mode == SessionMode::Running {
                    self.select_post(&post_id);
                }
            }
            CommandPayload::PerformAction { action } => {
                if self.status.mode == SessionMode::Running {
                    self.perform_action(action);
                }
            }
            CommandPayload::SetLossCheckOverride { enabled } => {
                self.set_loss_check_override(enabled);
            }
        }

        self.push_event(
            EventType::CommandApplied,
            "session".to_string(),
            vec![command_ref],
            Some(json!({ "command_type": command_type })),
        );
    }
}

//! Implements InputPort. Inquire-based interactive prompts.
//!
//! The ten-action operator menu: registration, inquiries, supplies, family
//! groups, display views. Labels resolve through the translation catalog;
//! domain errors are printed and the loop continues.

use crate::domain::{AllocationTarget, DomainError, SupplyStatus};
use crate::ports::{InputPort, TranslatePort};
use crate::usecases::{InquiryService, RegistryService, SupplyService};
use async_trait::async_trait;
use chrono::Utc;
use inquire::{Confirm, Select, Text};
use std::sync::Arc;

fn prompt_err(e: inquire::InquireError) -> DomainError {
    DomainError::Storage(format!("prompt failed: {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    AddVictim,
    LogInquiry,
    AllocateSupplies,
    CreateFamilyGroup,
    ModifyVictim,
    DisplayVictims,
    DisplayFamilyGroups,
    DisplayInventory,
    AssignToGroup,
    Exit,
}

const MENU: [(MenuAction, &str); 10] = [
    (MenuAction::AddVictim, "add_victim"),
    (MenuAction::LogInquiry, "log_inquiry"),
    (MenuAction::AllocateSupplies, "allocate_supplies"),
    (MenuAction::CreateFamilyGroup, "create_family_group"),
    (MenuAction::ModifyVictim, "modify_data"),
    (MenuAction::DisplayVictims, "display_victims"),
    (MenuAction::DisplayFamilyGroups, "display_family_groups"),
    (MenuAction::DisplayInventory, "display_inventory"),
    (MenuAction::AssignToGroup, "assign_to_group"),
    (MenuAction::Exit, "exit_program"),
];

/// TUI adapter. Inquire prompts over the use-case services.
pub struct ReliefTui {
    registry: Arc<RegistryService>,
    supplies: Arc<SupplyService>,
    inquiries: Arc<InquiryService>,
    i18n: Arc<dyn TranslatePort>,
}

impl ReliefTui {
    pub fn new(
        registry: Arc<RegistryService>,
        supplies: Arc<SupplyService>,
        inquiries: Arc<InquiryService>,
        i18n: Arc<dyn TranslatePort>,
    ) -> Self {
        Self {
            registry,
            supplies,
            inquiries,
            i18n,
        }
    }

    fn tr(&self, key: &str) -> String {
        self.i18n.translate(key)
    }

    async fn add_victim(&self) -> Result<(), DomainError> {
        let name = Text::new(&self.tr("enter_first_name"))
            .prompt()
            .map_err(prompt_err)?;
        let entry_date = Text::new(&self.tr("enter_entry_date"))
            .prompt()
            .map_err(prompt_err)?;
        self.registry.add_victim(&name, &entry_date).await?;
        println!("{}", self.tr("victim_added"));
        Ok(())
    }

    async fn log_inquiry(&self) -> Result<(), DomainError> {
        let known_victim = Confirm::new(&self.tr("are_you_a_victim"))
            .with_default(false)
            .prompt()
            .map_err(prompt_err)?;
        let inquirer = Text::new(&self.tr("enter_inquirer_name"))
            .prompt()
            .map_err(prompt_err)?;
        let missing = Text::new(&self.tr("enter_missing_person"))
            .prompt()
            .map_err(prompt_err)?;
        let date = Text::new(&self.tr("enter_inquiry_date"))
            .prompt()
            .map_err(prompt_err)?;
        self.inquiries
            .log_inquiry(&inquirer, known_victim, &missing, &date)
            .await?;
        println!("{}", self.tr("inquiry_logged"));
        Ok(())
    }

    async fn allocate_supplies(&self) -> Result<(), DomainError> {
        let kind = Select::new(
            &self.tr("enter_supply_type"),
            vec!["personal belonging", "blanket", "cot", "water"],
        )
        .prompt()
        .map_err(prompt_err)?;
        let quantity: u32 = Text::new(&self.tr("enter_quantity"))
            .prompt()
            .map_err(prompt_err)?
            .trim()
            .parse()
            .map_err(|_| DomainError::Validation("quantity must be a positive integer".into()))?;

        let target_kind = Select::new(
            &self.tr("allocate_to"),
            vec!["location", "person"],
        )
        .prompt()
        .map_err(prompt_err)?;
        let (location, person) = if target_kind == "location" {
            let l = Text::new(&self.tr("enter_location_name"))
                .prompt()
                .map_err(prompt_err)?;
            (Some(l), None)
        } else {
            let p = Text::new(&self.tr("enter_victim_name"))
                .prompt()
                .map_err(prompt_err)?;
            (None, Some(p))
        };

        self.supplies
            .allocate(kind, quantity, location, person, Utc::now())
            .await?;
        println!("{}", self.tr("supplies_allocated"));
        Ok(())
    }

    async fn create_family_group(&self) -> Result<(), DomainError> {
        let group_id: i64 = Text::new(&self.tr("enter_group_id"))
            .prompt()
            .map_err(prompt_err)?
            .trim()
            .parse()
            .map_err(|_| DomainError::Validation("group id must be an integer".into()))?;
        let head = Text::new(&self.tr("enter_head_name"))
            .prompt()
            .map_err(prompt_err)?;
        self.registry.create_group(group_id, &head).await?;
        println!("{}", self.tr("group_created"));
        Ok(())
    }

    async fn modify_victim(&self) -> Result<(), DomainError> {
        let name = Text::new(&self.tr("enter_victim_name"))
            .prompt()
            .map_err(prompt_err)?;
        let field = Select::new(
            &self.tr("select_field"),
            vec!["first name", "entry date", "gender"],
        )
        .prompt()
        .map_err(prompt_err)?;
        match field {
            "first name" => {
                let new_name = Text::new(&self.tr("enter_first_name"))
                    .prompt()
                    .map_err(prompt_err)?;
                self.registry.rename_victim(&name, &new_name).await?;
            }
            "entry date" => {
                let date = Text::new(&self.tr("enter_entry_date"))
                    .prompt()
                    .map_err(prompt_err)?;
                self.registry.update_entry_date(&name, &date).await?;
            }
            _ => {
                let gender = Select::new(
                    &self.tr("enter_gender"),
                    vec!["MALE", "FEMALE", "NON_BINARY", "UNSPECIFIED"],
                )
                .prompt()
                .map_err(prompt_err)?;
                self.registry.set_gender(&name, gender).await?;
            }
        }
        println!("{}", self.tr("data_updated"));
        Ok(())
    }

    async fn display_victims(&self) -> Result<(), DomainError> {
        let victims = self.registry.list_victims().await?;
        if victims.is_empty() {
            println!("{}", self.tr("no_victims"));
            return Ok(());
        }
        for v in victims {
            println!(
                "- {} (entry: {}, gender: {})",
                v.first_name(),
                v.entry_date(),
                v.gender().as_str()
            );
        }
        Ok(())
    }

    async fn display_family_groups(&self) -> Result<(), DomainError> {
        let groups = self.registry.list_groups().await?;
        if groups.is_empty() {
            println!("{}", self.tr("no_groups"));
            return Ok(());
        }
        for g in groups {
            println!(
                "- group {} | head: {} | members: {}",
                g.group_id(),
                g.head_name(),
                g.members().join(", ")
            );
        }
        Ok(())
    }

    async fn display_inventory(&self) -> Result<(), DomainError> {
        let supplies = self.supplies.inventory().await?;
        if supplies.is_empty() {
            println!("{}", self.tr("no_inventory"));
            return Ok(());
        }
        for s in supplies {
            let target = match s.target() {
                AllocationTarget::Location(l) => format!("location {l}"),
                AllocationTarget::Person(p) => format!("person {p}"),
            };
            let status = match s.status() {
                SupplyStatus::Active => "active",
                SupplyStatus::Expired => "expired",
            };
            println!(
                "- {} x{} -> {} [{}]",
                s.kind().as_str(),
                s.quantity(),
                target,
                status
            );
        }
        Ok(())
    }

    async fn assign_to_group(&self) -> Result<(), DomainError> {
        let name = Text::new(&self.tr("enter_victim_name"))
            .prompt()
            .map_err(prompt_err)?;
        let group_id: i64 = Text::new(&self.tr("enter_group_id"))
            .prompt()
            .map_err(prompt_err)?
            .trim()
            .parse()
            .map_err(|_| DomainError::Validation("group id must be an integer".into()))?;
        self.registry.assign_to_group(&name, group_id).await?;
        println!("{}", self.tr("victim_assigned"));
        Ok(())
    }

    async fn dispatch(&self, action: MenuAction) -> Result<(), DomainError> {
        match action {
            MenuAction::AddVictim => self.add_victim().await,
            MenuAction::LogInquiry => self.log_inquiry().await,
            MenuAction::AllocateSupplies => self.allocate_supplies().await,
            MenuAction::CreateFamilyGroup => self.create_family_group().await,
            MenuAction::ModifyVictim => self.modify_victim().await,
            MenuAction::DisplayVictims => self.display_victims().await,
            MenuAction::DisplayFamilyGroups => self.display_family_groups().await,
            MenuAction::DisplayInventory => self.display_inventory().await,
            MenuAction::AssignToGroup => self.assign_to_group().await,
            MenuAction::Exit => Ok(()),
        }
    }
}

#[async_trait]
impl InputPort for ReliefTui {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let labels: Vec<String> = MENU.iter().map(|(_, key)| self.tr(key)).collect();
            // Dispatch by index: translated labels are display-only and may
            // collide between catalogs.
            let choice = Select::new(&self.tr("main_menu"), labels)
                .raw_prompt()
                .map_err(prompt_err)?;
            let (action, _) = MENU[choice.index];

            if action == MenuAction::Exit {
                println!("{}", self.tr("exiting"));
                return Ok(());
            }
            if let Err(e) = self.dispatch(action).await {
                println!("{}: {}", self.tr("error"), e);
            }
        }
    }
}

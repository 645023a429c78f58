//! TheReconquestMap group id with copy and refresh buttons

use tgdash_core::GroupReference;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct GroupPanelProps {
    pub group: GroupReference,
    pub on_refresh: Callback<()>,
    pub on_copy: Callback<()>,
}

#[function_component(GroupPanel)]
pub fn group_panel(props: &GroupPanelProps) -> Html {
    let on_refresh = {
        let on_refresh = props.on_refresh.clone();
        Callback::from(move |_| on_refresh.emit(()))
    };
    let on_copy = {
        let on_copy = props.on_copy.clone();
        Callback::from(move |_| on_copy.emit(()))
    };

    html! {
        <div class="group-panel">
            <button
                class="btn btn-secondary"
                disabled={props.group.refresh_pending}
                onclick={on_refresh}
            >
                { "Refresh chats" }
            </button>
            // Hidden until the first refresh finishes
            if props.group.fetched {
                <div class="group-info">
                    <span class="label">{ "TheReconquestMap id: " }</span>
                    <span class="group-id">{ props.group.display() }</span>
                    <button
                        class="btn btn-sm"
                        disabled={!props.group.can_copy()}
                        onclick={on_copy}
                    >
                        { "Copy" }
                    </button>
                </div>
            }
        </div>
    }
}

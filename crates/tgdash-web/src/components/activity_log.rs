//! Activity log panel

use tgdash_core::ActivityEntry;
use web_sys::HtmlElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ActivityLogProps {
    pub entries: Vec<ActivityEntry>,
    #[prop_or_default]
    pub on_clear: Callback<()>,
}

pub enum ActivityLogMsg {
    Clear,
}

/// Keeps the newest entry in view after every render
pub struct ActivityLogView {
    container_ref: NodeRef,
}

impl Component for ActivityLogView {
    type Message = ActivityLogMsg;
    type Properties = ActivityLogProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            container_ref: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ActivityLogMsg::Clear => {
                ctx.props().on_clear.emit(());
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let entries = &ctx.props().entries;

        html! {
            <div class="activity-log">
                <div class="activity-log-header">
                    <h2>{ "Activity" }</h2>
                    <button
                        class="btn btn-sm"
                        onclick={ctx.link().callback(|_| ActivityLogMsg::Clear)}
                    >
                        { "Clear logs" }
                    </button>
                </div>
                <div class="logs-container" ref={self.container_ref.clone()}>
                    { for entries.iter().map(|entry| html! {
                        <div class={classes!("log-entry", entry.severity.as_str().to_string())}>
                            { &entry.text }
                        </div>
                    }) }
                </div>
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        if let Some(container) = self.container_ref.cast::<HtmlElement>() {
            container.set_scroll_top(container.scroll_height());
        }
    }
}
